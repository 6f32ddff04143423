use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use tracing::debug;

use crate::model::chain::Chain;
use crate::model::wallet::short_addr;

use super::{BalanceReader, ChainReadError};

// ── Balance accessor ABI ───────────────────────────────────────────

// ERC20 and ERC721 share this selector, so one fragment covers both assets.
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IBalanceOf {
        function balanceOf(address owner) external view returns (uint256 balance);
    }
}

// ── Provider factory ───────────────────────────────────────────────

/// Create an alloy HTTP provider for a given chain.
pub fn create_provider(chain: &Chain) -> Result<DynProvider, ChainReadError> {
    let url = chain
        .rpc_url()
        .parse()
        .map_err(|e| ChainReadError::Rpc(format!("invalid RPC URL for chain {chain}: {e}")))?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

// ── Reader ─────────────────────────────────────────────────────────

/// [`BalanceReader`] backed by a JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcBalanceReader {
    provider: DynProvider,
    chain_name: String,
}

impl RpcBalanceReader {
    pub fn new(chain: &Chain) -> Result<Self, ChainReadError> {
        Ok(Self {
            provider: create_provider(chain)?,
            chain_name: chain.name.clone(),
        })
    }
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn balance_of(&self, contract: Address, holder: Address) -> Result<U256, ChainReadError> {
        debug!(
            chain = %self.chain_name,
            contract = %short_addr(&contract),
            holder = %short_addr(&holder),
            "balanceOf"
        );
        IBalanceOf::new(contract, &self.provider)
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| classify(contract, e))
    }
}

/// Split alloy's contract errors into endpoint failures and call failures.
fn classify(contract: Address, err: alloy::contract::Error) -> ChainReadError {
    match &err {
        // eth_call on an address without code returns `0x`
        alloy::contract::Error::ZeroData(..) => ChainReadError::ContractCall {
            contract,
            reason: "no contract code at address".into(),
        },
        // Only a revert is the contract's fault; rate limits, internal
        // errors and missing methods are the endpoint's.
        alloy::contract::Error::TransportError(rpc) => match rpc.as_error_resp() {
            Some(payload)
                if payload.code == 3
                    || payload.as_revert_data().is_some()
                    || payload.message.to_lowercase().contains("revert") =>
            {
                ChainReadError::ContractCall {
                    contract,
                    reason: payload.to_string(),
                }
            }
            Some(payload) => ChainReadError::Rpc(payload.to_string()),
            None => ChainReadError::Rpc(rpc.to_string()),
        },
        _ => ChainReadError::Rpc(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_rpc_url() {
        let chain = Chain::meld().with_rpc_url("not a url");
        match RpcBalanceReader::new(&chain) {
            Err(ChainReadError::Rpc(msg)) => assert!(msg.contains("invalid RPC URL")),
            Err(other) => panic!("expected Rpc error, got {other:?}"),
            Ok(_) => panic!("expected Rpc error, got a reader"),
        }
    }
}
