#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use meld_gate::Onboarding;
use meld_gate::chain::{BalanceReader, ChainReadError};
use meld_gate::evaluator::{AssetGate, Evaluator};
use meld_gate::invite::InviteIssuer;
use meld_gate::model::balance::to_token_units;
use meld_gate::model::record::{InviteLink, OnboardingRecord};
use meld_gate::network::{NetworkGuard, SwitchError, WalletConnector};
use meld_gate::store::{PersistenceError, RecordStore};

// ── Constants ────────────────────────────────────────────────────────

pub const MELD_CHAIN_ID: u64 = 333_000_333;
pub const OTHER_CHAIN_ID: u64 = 1;

pub fn holder() -> Address {
    Address::repeat_byte(0x42)
}

pub fn gate() -> AssetGate {
    AssetGate::default()
}

pub fn tokens(whole: u64) -> U256 {
    to_token_units(whole, 18)
}

// ── Balance reader ───────────────────────────────────────────────────

/// Answers `balanceOf` from a per-contract table and counts calls.
#[derive(Default)]
pub struct MockReader {
    answers: Mutex<HashMap<Address, Result<U256, ChainReadError>>>,
    calls: AtomicUsize,
}

impl MockReader {
    pub fn with_balances(token: U256, nft: U256) -> Arc<Self> {
        let reader = Self::default();
        reader.set(gate().token_contract, Ok(token));
        reader.set(gate().nft_contract, Ok(nft));
        Arc::new(reader)
    }

    pub fn failing() -> Arc<Self> {
        let reader = Self::default();
        reader.set(gate().token_contract, Err(ChainReadError::Rpc("connection refused".into())));
        reader.set(
            gate().nft_contract,
            Err(ChainReadError::ContractCall {
                contract: gate().nft_contract,
                reason: "execution reverted".into(),
            }),
        );
        Arc::new(reader)
    }

    pub fn set(&self, contract: Address, answer: Result<U256, ChainReadError>) {
        self.answers.lock().unwrap().insert(contract, answer);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceReader for MockReader {
    async fn balance_of(&self, contract: Address, _holder: Address) -> Result<U256, ChainReadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .get(&contract)
            .cloned()
            .unwrap_or(Err(ChainReadError::ContractCall {
                contract,
                reason: "no contract code at address".into(),
            }))
    }
}

// ── Invite issuer ────────────────────────────────────────────────────

/// Returns queued answers in order, then repeats the last one.
pub struct MockIssuer {
    answers: Mutex<Vec<Result<InviteLink, String>>>,
    calls: AtomicUsize,
}

impl MockIssuer {
    pub fn ok(url: &str) -> Arc<Self> {
        Self::sequence(vec![Ok(InviteLink::new(url))])
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Self::sequence(vec![Err(reason.to_string())])
    }

    pub fn sequence(answers: Vec<Result<InviteLink, String>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InviteIssuer for MockIssuer {
    async fn generate_link(&self) -> Result<InviteLink, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.remove(0)
        } else {
            answers[0].clone()
        }
    }
}

// ── Wallet ───────────────────────────────────────────────────────────

pub struct MockWallet {
    answer: Result<(), SwitchError>,
    calls: AtomicUsize,
}

impl MockWallet {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn rejecting(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(SwitchError::new(reason)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn switch_network(&self, _chain_id: u64) -> Result<(), SwitchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

// ── Record store ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<OnboardingRecord>>,
    fail_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        })
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &OnboardingRecord) -> Result<(), PersistenceError> {
        if let Some(reason) = &self.fail_with {
            return Err(PersistenceError::Rejected(reason.clone()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ── Wiring ───────────────────────────────────────────────────────────

pub struct Harness {
    pub flow: Onboarding,
    pub reader: Arc<MockReader>,
    pub wallet: Arc<MockWallet>,
    pub issuer: Arc<MockIssuer>,
    pub store: Arc<MemoryStore>,
}

pub fn harness(reader: Arc<MockReader>, wallet: Arc<MockWallet>, issuer: Arc<MockIssuer>, store: Arc<MemoryStore>) -> Harness {
    let evaluator = Evaluator::new(reader.clone(), gate(), MELD_CHAIN_ID).with_prefetch(issuer.clone());
    let guard = NetworkGuard::new(wallet.clone(), MELD_CHAIN_ID);
    let flow = Onboarding::new(guard, evaluator, store.clone(), issuer.clone());
    Harness {
        flow,
        reader,
        wallet,
        issuer,
        store,
    }
}

/// Eligible by tokens, accepting wallet, working invite service.
pub fn eligible_harness() -> Harness {
    harness(
        MockReader::with_balances(tokens(6_000_000), U256::ZERO),
        MockWallet::accepting(),
        MockIssuer::ok("https://t.me/+invite"),
        MemoryStore::new(),
    )
}

pub fn ineligible_harness() -> Harness {
    harness(
        MockReader::with_balances(tokens(10), U256::ZERO),
        MockWallet::accepting(),
        MockIssuer::ok("https://t.me/+invite"),
        MemoryStore::new(),
    )
}
