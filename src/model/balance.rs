use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A raw `balanceOf` reading for one holder on one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub contract_address: Address,
    pub raw_amount: U256,
    pub decimals: u8,
}

impl AssetBalance {
    pub fn new(contract_address: Address, raw_amount: U256, decimals: u8) -> Self {
        Self {
            contract_address,
            raw_amount,
            decimals,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.raw_amount.is_zero()
    }

    /// Human-readable amount without trailing zeros, e.g. `6000000` or `2.5`.
    pub fn formatted(&self) -> String {
        format_amount(self.raw_amount, self.decimals)
    }
}

impl std::fmt::Display for AssetBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// `raw / 10^decimals` as a decimal string with trailing zeros dropped.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    match format_units(raw, decimals) {
        Ok(s) if s.contains('.') => s.trim_end_matches('0').trim_end_matches('.').to_string(),
        Ok(s) => s,
        Err(_) => raw.to_string(),
    }
}

/// `whole × 10^decimals` as a raw on-chain amount, `None` if it does not
/// fit in a `uint256`.
pub fn checked_token_units(whole: u64, decimals: u8) -> Option<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))?
        .checked_mul(U256::from(whole))
}

/// Like [`checked_token_units`], saturating at `U256::MAX` instead of wrapping.
pub fn to_token_units(whole: u64, decimals: u8) -> U256 {
    checked_token_units(whole, decimals).unwrap_or(U256::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_token_units() {
        assert_eq!(to_token_units(5, 0), U256::from(5u64));
        assert_eq!(
            to_token_units(5_000_000, 18),
            U256::from(5_000_000u128 * 10u128.pow(18))
        );
    }

    #[test]
    fn test_overflowing_units_do_not_wrap() {
        assert_eq!(checked_token_units(10_000_000_000, 70), None);
        assert_eq!(checked_token_units(1, 78), None);
        assert_eq!(to_token_units(10_000_000_000, 70), U256::MAX);
        assert_eq!(checked_token_units(1, 77), Some(U256::from(10u64).pow(U256::from(77u64))));
    }

    #[test]
    fn test_display_uses_decimals() {
        let nft = AssetBalance::new(Address::ZERO, U256::from(3u64), 0);
        assert_eq!(nft.to_string(), "3");

        let token = AssetBalance::new(Address::ZERO, to_token_units(6_000_000, 18), 18);
        assert_eq!(token.to_string(), "6000000");
        assert!(!token.is_zero());

        let half = AssetBalance::new(Address::ZERO, U256::from(25u64) * U256::from(10u64).pow(U256::from(17u64)), 18);
        assert_eq!(half.to_string(), "2.5");
    }
}
