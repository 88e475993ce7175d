// crates/quarry-economics/src/token.rs
//
// Token amounts and mint records.
//
// Amounts are integers in the mint's smallest unit. A mint with `decimals = 6`
// represents 1 whole token as 1_000_000 units. All accounting is integer-only
// to avoid floating-point rounding in reward math.

use serde::{Deserialize, Serialize};
use std::fmt;

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;

/// Largest supported number of decimals on a mint.
pub const MAX_DECIMALS: u8 = 18;

/// A registered token mint. Immutable once created except for its supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub key: Pubkey,
    /// Administrator allowed to manage minter allowances.
    pub authority: Pubkey,
    pub decimals: u8,
    /// Maximum supply, if capped.
    pub hard_cap: Option<u64>,
    /// Units issued so far.
    pub supply: u64,
}

impl Mint {
    /// Build a mint record, validating `decimals`.
    pub fn new(key: Pubkey, authority: Pubkey, decimals: u8, hard_cap: Option<u64>) -> Result<Self, QuarryError> {
        if decimals > MAX_DECIMALS {
            return Err(QuarryError::InvalidDecimals(decimals));
        }
        Ok(Self {
            key,
            authority,
            decimals,
            hard_cap,
            supply: 0,
        })
    }

    /// Supply after minting `amount`, enforcing the hard cap.
    pub fn supply_after_mint(&self, amount: u64) -> Result<u64, QuarryError> {
        let new_supply = self
            .supply
            .checked_add(amount)
            .ok_or_else(|| QuarryError::InvalidAmount(format!("Supply overflow minting {}", amount)))?;
        if let Some(hard_cap) = self.hard_cap {
            if new_supply > hard_cap {
                return Err(QuarryError::HardcapExceeded { new_supply, hard_cap });
            }
        }
        Ok(new_supply)
    }
}

/// An amount of a token together with its decimal precision, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub units: u64,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(units: u64, decimals: u8) -> Self {
        Self { units, decimals }
    }

    /// Convert from whole tokens, truncating below the smallest unit.
    pub fn from_tokens(tokens: u64, decimals: u8) -> Option<Self> {
        let units = tokens.checked_mul(10u64.checked_pow(decimals as u32)?)?;
        Some(Self { units, decimals })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 10^19 does not fit in u64; u128 keeps 18 decimals exact.
        let per = 10u128.pow(self.decimals as u32);
        let whole = self.units as u128 / per;
        let frac = self.units as u128 % per;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:0width$}", frac, width = self.decimals as usize);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mint(decimals: u8, hard_cap: Option<u64>) -> Mint {
        Mint::new(Pubkey::new([1u8; 32]), Pubkey::new([2u8; 32]), decimals, hard_cap).unwrap()
    }

    #[test]
    fn test_mint_rejects_decimals_above_18() {
        let result = Mint::new(Pubkey::default(), Pubkey::default(), 19, None);
        assert_eq!(result, Err(QuarryError::InvalidDecimals(19)));
        assert!(Mint::new(Pubkey::default(), Pubkey::default(), 18, None).is_ok());
        assert!(Mint::new(Pubkey::default(), Pubkey::default(), 0, None).is_ok());
    }

    #[test]
    fn test_supply_after_mint_respects_hard_cap() {
        let mut m = mint(6, Some(100));
        assert_eq!(m.supply_after_mint(100), Ok(100));
        m.supply = 60;
        assert_eq!(
            m.supply_after_mint(41),
            Err(QuarryError::HardcapExceeded {
                new_supply: 101,
                hard_cap: 100
            })
        );
    }

    #[test]
    fn test_supply_after_mint_uncapped_overflow() {
        let mut m = mint(0, None);
        m.supply = u64::MAX;
        assert!(matches!(m.supply_after_mint(1), Err(QuarryError::InvalidAmount(_))));
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(TokenAmount::new(42_000_000, 6).to_string(), "42");
    }

    #[test]
    fn test_display_fractional() {
        assert_eq!(TokenAmount::new(1_500_000, 6).to_string(), "1.5");
        assert_eq!(TokenAmount::new(1, 6).to_string(), "0.000001");
    }

    #[test]
    fn test_display_zero_decimals() {
        assert_eq!(TokenAmount::new(7, 0).to_string(), "7");
    }

    #[test]
    fn test_display_max_decimals() {
        assert_eq!(TokenAmount::new(1_500_000_000_000_000_000, 18).to_string(), "1.5");
    }

    #[test]
    fn test_from_tokens() {
        assert_eq!(TokenAmount::from_tokens(1_000, 6).unwrap().units, 1_000_000_000);
        assert!(TokenAmount::from_tokens(u64::MAX, 6).is_none());
    }
}
