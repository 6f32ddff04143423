use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::evaluator::{AssetGate, MELD_BANKER_NFT, MELD_TOKEN};
use crate::invite::DEFAULT_INVITE_SERVICE;
use crate::model::balance::checked_token_units;
use crate::model::chain::Chain;
use crate::model::eligibility::{DEFAULT_MIN_TOKEN_BALANCE, DEFAULT_TOKEN_DECIMALS, Threshold};

/// Env var holding the wallet-connect project id.
pub const PROJECT_ID_ENV: &str = "MELD_GATE_PROJECT_ID";

/// Everything needed to wire an onboarding workflow.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub chain: Chain,
    pub token_contract: Address,
    pub token_decimals: u8,
    pub nft_contract: Address,
    /// Minimum fungible holding, in whole tokens.
    pub min_token_balance: u64,
    /// Base URL of the invite service (`/generate-link` is appended).
    pub invite_service_url: String,
    pub db_path: PathBuf,
    /// HTTP timeout for the invite service. Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
    /// Wallet-connect project id; usually supplied through the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            chain: Chain::meld(),
            token_contract: MELD_TOKEN,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            nft_contract: MELD_BANKER_NFT,
            min_token_balance: DEFAULT_MIN_TOKEN_BALANCE,
            invite_service_url: DEFAULT_INVITE_SERVICE.to_string(),
            db_path: default_db_path(),
            http_timeout_secs: None,
            project_id: None,
        }
    }
}

/// `~/.meld-gate/records.db`, or `./.meld-gate/records.db` without a home dir.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".meld-gate")
        .join("records.db")
}

impl GateConfig {
    /// Read a JSON config file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: GateConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_contract == self.nft_contract {
            bail!("token_contract and nft_contract must differ");
        }
        if self.invite_service_url.trim().is_empty() {
            bail!("invite_service_url must not be empty");
        }
        if checked_token_units(self.min_token_balance, self.token_decimals).is_none() {
            bail!(
                "min_token_balance {} with token_decimals {} does not fit a uint256 amount",
                self.min_token_balance,
                self.token_decimals
            );
        }
        Ok(())
    }

    pub fn gate(&self) -> AssetGate {
        AssetGate {
            token_contract: self.token_contract,
            token_decimals: self.token_decimals,
            nft_contract: self.nft_contract,
            threshold: Threshold::new(self.min_token_balance, self.token_decimals),
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// The project id, from the config or [`PROJECT_ID_ENV`]. Required to
    /// initialise the wallet collaborator.
    pub fn require_project_id(&self) -> Result<String> {
        let from_env = std::env::var(PROJECT_ID_ENV).ok();
        match self.project_id.clone().or(from_env) {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => bail!(
                "{PROJECT_ID_ENV} env var not set. \
                 Set it to the wallet-connect project id of this deployment."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GateConfig =
            serde_json::from_str(r#"{"min_token_balance": 10, "http_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.min_token_balance, 10);
        assert_eq!(config.chain, Chain::meld());
        assert_eq!(config.token_contract, MELD_TOKEN);
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_gate_threshold_uses_decimals() {
        let config = GateConfig {
            min_token_balance: 3,
            token_decimals: 2,
            ..GateConfig::default()
        };
        assert_eq!(config.gate().threshold.min_token_raw, alloy::primitives::U256::from(300u64));
    }

    #[test]
    fn test_validate_rejects_same_contracts() {
        let config = GateConfig {
            nft_contract: MELD_TOKEN,
            ..GateConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(GateConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overflowing_threshold() {
        let config: GateConfig =
            serde_json::from_str(r#"{"token_decimals": 70, "min_token_balance": 10000000000}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not fit"), "{err}");

        let too_many_decimals = GateConfig {
            token_decimals: 78,
            min_token_balance: 1,
            ..GateConfig::default()
        };
        assert!(too_many_decimals.validate().is_err());

        let widest = GateConfig {
            token_decimals: 77,
            min_token_balance: 1,
            ..GateConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_explicit_project_id_wins() {
        let config = GateConfig {
            project_id: Some("abc123".into()),
            ..GateConfig::default()
        };
        assert_eq!(config.require_project_id().unwrap(), "abc123");

        let blank = GateConfig {
            project_id: Some("   ".into()),
            ..GateConfig::default()
        };
        // A blank id in the file shadows the env var and is rejected.
        assert!(blank.require_project_id().is_err());
    }
}
