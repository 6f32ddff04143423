use std::sync::Mutex;

use alloy::primitives::Address;
use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::info;

use crate::model::wallet::WalletEvent;
use crate::network::{SwitchError, WalletConnector};

/// Wallet collaborator for terminal use: a fixed address, a reported chain
/// id, and a fixed answer to switch requests.
pub struct HeadlessWallet {
    project_id: String,
    address: Address,
    chain_id: Mutex<u64>,
    accept_switch: bool,
}

impl HeadlessWallet {
    pub fn new(project_id: impl Into<String>, address: Address, chain_id: u64, accept_switch: bool) -> Result<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            bail!("wallet project id must not be empty");
        }
        Ok(Self {
            project_id,
            address,
            chain_id: Mutex::new(chain_id),
            accept_switch,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn chain_id(&self) -> u64 {
        *self.chain_id.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The event a real wallet emits once the user approves the connection.
    pub fn connect_event(&self) -> WalletEvent {
        WalletEvent::Connected {
            address: self.address,
            chain_id: self.chain_id(),
        }
    }
}

#[async_trait]
impl WalletConnector for HeadlessWallet {
    async fn switch_network(&self, chain_id: u64) -> Result<(), SwitchError> {
        if !self.accept_switch {
            return Err(SwitchError::new(format!(
                "User rejected the request: headless wallet is pinned to chain {}",
                self.chain_id()
            )));
        }
        *self.chain_id.lock().unwrap_or_else(|e| e.into_inner()) = chain_id;
        info!(chain_id, "headless wallet switched network");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_project_id() {
        assert!(HeadlessWallet::new(" ", Address::ZERO, 1, true).is_err());
    }

    #[tokio::test]
    async fn test_switch_follows_policy() {
        let pinned = HeadlessWallet::new("p", Address::ZERO, 1, false).unwrap();
        let err = pinned.switch_network(333_000_333).await.unwrap_err();
        assert!(err.reason.contains("rejected"));
        assert_eq!(pinned.chain_id(), 1);

        let flexible = HeadlessWallet::new("p", Address::ZERO, 1, true).unwrap();
        flexible.switch_network(333_000_333).await.unwrap();
        assert_eq!(flexible.chain_id(), 333_000_333);
        assert_eq!(
            flexible.connect_event(),
            WalletEvent::Connected {
                address: Address::ZERO,
                chain_id: 333_000_333
            }
        );
    }
}
