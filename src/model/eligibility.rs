use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::balance::{AssetBalance, to_token_units};

/// Minimum fungible holding, in whole tokens.
pub const DEFAULT_MIN_TOKEN_BALANCE: u64 = 5_000_000;
/// Decimals of the gated fungible token.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Threshold rules: enough fungible tokens OR at least one NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub min_token_raw: U256,
}

impl Threshold {
    pub fn new(min_whole_tokens: u64, decimals: u8) -> Self {
        Self {
            min_token_raw: to_token_units(min_whole_tokens, decimals),
        }
    }

    pub fn token_meets(&self, token: &AssetBalance) -> bool {
        token.raw_amount >= self.min_token_raw
    }

    pub fn nft_meets(&self, nft: &AssetBalance) -> bool {
        nft.raw_amount > U256::ZERO
    }

    pub fn decide(&self, token: &AssetBalance, nft: &AssetBalance) -> bool {
        self.token_meets(token) || self.nft_meets(nft)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKEN_BALANCE, DEFAULT_TOKEN_DECIMALS)
    }
}

/// Outcome of a completed eligibility check. Only produced once both
/// balance reads have succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub token_balance: AssetBalance,
    pub nft_balance: AssetBalance,
    pub is_eligible: bool,
}

impl EligibilityResult {
    pub fn evaluate(token_balance: AssetBalance, nft_balance: AssetBalance, threshold: &Threshold) -> Self {
        let is_eligible = threshold.decide(&token_balance, &nft_balance);
        Self {
            token_balance,
            nft_balance,
            is_eligible,
        }
    }
}

/// What a UI shows for eligibility. `Unchecked` is distinct from `Ineligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    Unchecked,
    Eligible,
    Ineligible,
}

impl From<Option<&EligibilityResult>> for EligibilityStatus {
    fn from(result: Option<&EligibilityResult>) -> Self {
        match result {
            None => EligibilityStatus::Unchecked,
            Some(r) if r.is_eligible => EligibilityStatus::Eligible,
            Some(_) => EligibilityStatus::Ineligible,
        }
    }
}
