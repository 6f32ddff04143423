pub mod evm;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

pub use evm::RpcBalanceReader;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainReadError {
    /// Endpoint unreachable, answered with a non-revert error (rate limit,
    /// internal error, unknown method), or returned something that is not a `uint256`.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The call reverted, or there is no contract at the address.
    #[error("contract call to {contract} failed: {reason}")]
    ContractCall { contract: Address, reason: String },
}

/// Reads `balanceOf(holder)` from a contract on one fixed network.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn balance_of(&self, contract: Address, holder: Address) -> Result<U256, ChainReadError>;
}
