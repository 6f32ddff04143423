use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// The wallet refused or failed to switch networks. `reason` is the
/// wallet's own message, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SwitchError {
    pub reason: String,
}

impl SwitchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The wallet-connection collaborator, as far as the workflow needs it.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet to make `chain_id` its active network.
    async fn switch_network(&self, chain_id: u64) -> Result<(), SwitchError>;
}

pub fn is_correct_network(active_id: u64, required_id: u64) -> bool {
    active_id == required_id
}

/// Enforces the required network before any balance read.
#[derive(Clone)]
pub struct NetworkGuard {
    wallet: Arc<dyn WalletConnector>,
    required_id: u64,
}

impl NetworkGuard {
    pub fn new(wallet: Arc<dyn WalletConnector>, required_id: u64) -> Self {
        Self { wallet, required_id }
    }

    pub fn required_id(&self) -> u64 {
        self.required_id
    }

    pub fn is_satisfied(&self, active_id: u64) -> bool {
        is_correct_network(active_id, self.required_id)
    }

    /// Single attempt; a rejection is returned to the caller, never retried.
    pub async fn switch_network(&self) -> Result<(), SwitchError> {
        info!(chain_id = self.required_id, "requesting network switch");
        self.wallet
            .switch_network(self.required_id)
            .await
            .inspect_err(|e| warn!(chain_id = self.required_id, reason = %e, "network switch failed"))
    }
}
