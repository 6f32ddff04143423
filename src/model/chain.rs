use serde::{Deserialize, Serialize};

/// Native currency of a chain, as a wallet displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The network both gated asset contracts live on.
///
/// In JSON:
/// `{"name": "meld", "chain_id": 333000333, "rpc_url": "https://...", ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Human-readable chain name (e.g. "meld").
    pub name: String,
    /// EVM chain ID the wallet must report.
    pub chain_id: u64,
    /// JSON-RPC endpoint used for balance reads.
    pub rpc_url: String,
    pub native_currency: NativeCurrency,
    /// Block explorer base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

// ── Methods ──────────────────────────────────────────────────────────

impl Chain {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Explorer link for an address, if this chain has an explorer.
    pub fn address_url(&self, address: &str) -> Option<String> {
        self.explorer_url
            .as_deref()
            .map(|base| format!("{}/address/{address}", base.trim_end_matches('/')))
    }

    /// Same chain with a different RPC endpoint (e.g. a private node or a local fork).
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

// ── Convenience constructors ─────────────────────────────────────────

impl Chain {
    /// Meld mainnet, an Avalanche subnet.
    pub fn meld() -> Self {
        Chain {
            name: "meld".into(),
            chain_id: 333_000_333,
            rpc_url: "https://subnets.avax.network/meld/mainnet/rpc".into(),
            native_currency: NativeCurrency {
                name: "gMELD".into(),
                symbol: "gMELD".into(),
                decimals: 18,
            },
            explorer_url: Some("https://meldscan.io".into()),
        }
    }

    /// Custom EVM chain with chain_id + rpc_url and an 18-decimal native currency.
    pub fn custom(name: impl Into<String>, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        let name = name.into();
        Chain {
            native_currency: NativeCurrency {
                name: name.to_uppercase(),
                symbol: name.to_uppercase(),
                decimals: 18,
            },
            name,
            chain_id,
            rpc_url: rpc_url.into(),
            explorer_url: None,
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::meld()
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meld_descriptor() {
        let chain = Chain::meld();
        assert_eq!(chain.chain_id(), 333_000_333);
        assert_eq!(chain.native_currency.symbol, "gMELD");
        assert_eq!(chain.to_string(), "meld (333000333)");
    }

    #[test]
    fn test_address_url() {
        let chain = Chain::meld();
        assert_eq!(
            chain.address_url("0xabc").as_deref(),
            Some("https://meldscan.io/address/0xabc")
        );
        assert!(Chain::custom("anvil", 31337, "http://localhost:8545")
            .address_url("0xabc")
            .is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_missing_explorer() {
        let json = r#"{
            "name": "anvil",
            "chain_id": 31337,
            "rpc_url": "http://127.0.0.1:8545",
            "native_currency": {"name": "ETH", "symbol": "ETH", "decimals": 18}
        }"#;
        let chain: Chain = serde_json::from_str(json).unwrap();
        assert_eq!(chain.chain_id, 31337);
        assert!(chain.explorer_url.is_none());
    }
}
