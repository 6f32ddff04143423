use std::sync::Arc;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::chain::{BalanceReader, ChainReadError};
use crate::invite::{FetchStage, InviteFetchError, InviteIssuer, fetch_invite};
use crate::model::balance::AssetBalance;
use crate::model::eligibility::{EligibilityResult, Threshold};
use crate::model::record::InviteLink;
use crate::model::wallet::{WalletSession, short_addr};
use crate::network::is_correct_network;

pub const MELD_TOKEN: Address = alloy::primitives::address!("0x333000333528b1e38884a5d1EF13615B0C17a301");
pub const MELD_BANKER_NFT: Address = alloy::primitives::address!("0x333000Dca02578EfE421BE77FF0aCC0F947290f0");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Please switch to the required network (chain {required}, wallet is on {active})")]
    WrongNetwork { active: u64, required: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Chain(#[from] ChainReadError),
}

/// The two gated contracts and the rule combining them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGate {
    pub token_contract: Address,
    pub token_decimals: u8,
    pub nft_contract: Address,
    pub threshold: Threshold,
}

impl Default for AssetGate {
    fn default() -> Self {
        Self {
            token_contract: MELD_TOKEN,
            token_decimals: crate::model::eligibility::DEFAULT_TOKEN_DECIMALS,
            nft_contract: MELD_BANKER_NFT,
            threshold: Threshold::default(),
        }
    }
}

/// What happened to the invite prefetch that follows a positive check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefetch {
    /// Not eligible, or no issuer attached.
    Skipped,
    Ready(InviteLink),
    Failed(InviteFetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub result: EligibilityResult,
    pub prefetch: Prefetch,
}

pub struct Evaluator {
    reader: Arc<dyn BalanceReader>,
    gate: AssetGate,
    required_network: u64,
    invites: Option<Arc<dyn InviteIssuer>>,
}

impl Evaluator {
    pub fn new(reader: Arc<dyn BalanceReader>, gate: AssetGate, required_network: u64) -> Self {
        Self {
            reader,
            gate,
            required_network,
            invites: None,
        }
    }

    /// Prefetch an invite after every positive check.
    pub fn with_prefetch(mut self, invites: Arc<dyn InviteIssuer>) -> Self {
        self.invites = Some(invites);
        self
    }

    pub fn gate(&self) -> &AssetGate {
        &self.gate
    }

    fn holder(&self, session: &WalletSession) -> Result<Address, PreconditionError> {
        let holder = session.connected_address().ok_or(PreconditionError::NotConnected)?;
        if !is_correct_network(session.active_network_id, self.required_network) {
            return Err(PreconditionError::WrongNetwork {
                active: session.active_network_id,
                required: self.required_network,
            });
        }
        Ok(holder)
    }

    /// Read both balances and decide. Nothing is read unless the wallet is
    /// connected on the required network; nothing is returned unless both
    /// reads succeed.
    pub async fn evaluate(&self, session: &WalletSession) -> Result<Evaluation, EvalError> {
        let holder = self.holder(session)?;

        let (token, nft) = tokio::join!(
            self.reader.balance_of(self.gate.token_contract, holder),
            self.reader.balance_of(self.gate.nft_contract, holder),
        );
        let token_balance = AssetBalance::new(self.gate.token_contract, token?, self.gate.token_decimals);
        let nft_balance = AssetBalance::new(self.gate.nft_contract, nft?, 0);

        let result = EligibilityResult::evaluate(token_balance, nft_balance, &self.gate.threshold);
        info!(
            holder = %short_addr(&holder),
            token = %result.token_balance,
            nft = %result.nft_balance,
            eligible = result.is_eligible,
            "eligibility evaluated"
        );

        let prefetch = match (&self.invites, result.is_eligible) {
            (Some(invites), true) => match fetch_invite(invites.as_ref(), FetchStage::Prefetch).await {
                Ok(link) => Prefetch::Ready(link),
                Err(e) => {
                    warn!(error = %e, "invite prefetch failed");
                    Prefetch::Failed(e)
                }
            },
            _ => Prefetch::Skipped,
        };

        Ok(Evaluation { result, prefetch })
    }
}
