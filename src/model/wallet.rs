use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Snapshot of the wallet collaborator's connection.
///
/// The wallet owns this; the onboarding workflow only mirrors the latest
/// snapshot it was told about through [`WalletEvent`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub connected: bool,
    pub active_network_id: u64,
}

impl WalletSession {
    pub fn connected(address: Address, active_network_id: u64) -> Self {
        Self {
            address: Some(address),
            connected: true,
            active_network_id,
        }
    }

    /// Address of a connected wallet, `None` while disconnected.
    pub fn connected_address(&self) -> Option<Address> {
        if self.connected { self.address } else { None }
    }
}

/// Notifications pushed by the wallet collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WalletEvent {
    Connected { address: Address, chain_id: u64 },
    ChainChanged { chain_id: u64 },
    AccountChanged { address: Address },
    Disconnected,
}

/// Shorten an address for display (`0x1234...abcd`).
pub fn short_addr(addr: &Address) -> String {
    let s = format!("{addr}");
    if s.len() > 10 {
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    } else {
        s
    }
}
