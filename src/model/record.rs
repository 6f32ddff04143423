use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::balance::AssetBalance;
use super::identity::IdentityAssertion;

/// Persisted link between a wallet and a messaging identity. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub id: Uuid,
    pub wallet_address: Address,
    pub username: String,
    pub external_id: String,
    pub token_balance: AssetBalance,
    pub nft_balance: AssetBalance,
    pub timestamp: DateTime<Utc>,
}

impl OnboardingRecord {
    pub fn new(
        wallet_address: Address,
        identity: &IdentityAssertion,
        token_balance: AssetBalance,
        nft_balance: AssetBalance,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_address,
            username: identity.normalized_username().to_string(),
            external_id: identity.external_id.clone(),
            token_balance,
            nft_balance,
            timestamp: Utc::now(),
        }
    }
}

/// Single-use link into the gated group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteLink {
    pub url: String,
}

impl InviteLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl std::fmt::Display for InviteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}
