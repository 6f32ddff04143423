use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{Connection, params};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::model::record::OnboardingRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Append-only sink for onboarding records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &OnboardingRecord) -> Result<(), PersistenceError>;
}

pub type Db = Arc<Mutex<Connection>>;

/// [`RecordStore`] backed by a local SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Db,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn count(&self) -> Result<u64, PersistenceError> {
        let conn = self.conn.lock().await;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM onboarding_records", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Usernames in insertion order.
    pub async fn usernames(&self) -> Result<Vec<String>, PersistenceError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT username FROM onboarding_records ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS onboarding_records (
            id                TEXT PRIMARY KEY,
            wallet_address    TEXT NOT NULL,
            username          TEXT NOT NULL,
            external_id       TEXT NOT NULL,
            token_contract    TEXT NOT NULL,
            token_balance     TEXT NOT NULL,
            token_decimals    INTEGER NOT NULL,
            nft_contract      TEXT NOT NULL,
            nft_balance       TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );
        ",
    )
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, record: &OnboardingRecord) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO onboarding_records (
                id, wallet_address, username, external_id,
                token_contract, token_balance, token_decimals,
                nft_contract, nft_balance, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                record.wallet_address.to_string(),
                record.username,
                record.external_id,
                record.token_balance.contract_address.to_string(),
                record.token_balance.raw_amount.to_string(),
                record.token_balance.decimals,
                record.nft_balance.contract_address.to_string(),
                record.nft_balance.raw_amount.to_string(),
                record.timestamp.to_rfc3339(),
            ],
        )?;
        info!(id = %record.id, "onboarding record stored");
        Ok(())
    }
}
