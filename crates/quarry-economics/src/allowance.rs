// crates/quarry-economics/src/allowance.rs
//
// Allowance ledger: how much of a token each authorized minter may still mint.
//
// Entries are keyed by the derived minter address of (mint, minter authority).
// `consume` is all-or-nothing: a rejected request leaves the entry untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::{minter_address, Pubkey};

/// One minter's allowance on one mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minter {
    pub mint: Pubkey,
    /// Identity allowed to mint against this entry.
    pub minter_authority: Pubkey,
    /// Auto-incrementing index of the minter on its mint.
    pub index: u64,
    /// Remaining number of units this minter may mint.
    pub allowance: u64,
    /// Cumulative number of units ever minted by this minter.
    pub total_minted: u64,
}

/// All minter allowances, across mints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceLedger {
    minters: BTreeMap<Pubkey, Minter>,
}

impl AllowanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_or_insert(&mut self, minter: &Pubkey, mint: &Pubkey) -> &mut Minter {
        let index = self.minters.values().filter(|m| m.mint == *mint).count() as u64;
        self.minters
            .entry(minter_address(mint, minter))
            .or_insert_with(|| Minter {
                mint: *mint,
                minter_authority: *minter,
                index,
                allowance: 0,
                total_minted: 0,
            })
    }

    /// Create or increase `minter`'s allowance on `mint` by `amount`.
    ///
    /// Returns the previous allowance.
    ///
    /// # Errors
    /// `InvalidAmount` if the new allowance would overflow.
    pub fn grant(&mut self, minter: &Pubkey, mint: &Pubkey, amount: u64) -> Result<u64, QuarryError> {
        let previous = self.remaining(minter, mint);
        let next = previous.checked_add(amount).ok_or_else(|| {
            QuarryError::InvalidAmount(format!(
                "Allowance overflow: {} + {} exceeds u64::MAX",
                previous, amount
            ))
        })?;
        self.entry_or_insert(minter, mint).allowance = next;
        Ok(previous)
    }

    /// Overwrite `minter`'s allowance on `mint`, creating the entry if missing.
    ///
    /// Returns the previous allowance.
    pub fn set_allowance(&mut self, minter: &Pubkey, mint: &Pubkey, allowance: u64) -> u64 {
        let entry = self.entry_or_insert(minter, mint);
        std::mem::replace(&mut entry.allowance, allowance)
    }

    /// Decrement `minter`'s remaining allowance on `mint` by `amount`.
    ///
    /// # Errors
    /// `NotFound` if no entry exists, `AllowanceExceeded` if `amount` is larger
    /// than what remains. The entry is unchanged on error.
    pub fn consume(&mut self, minter: &Pubkey, mint: &Pubkey, amount: u64) -> Result<(), QuarryError> {
        let entry = self
            .minters
            .get_mut(&minter_address(mint, minter))
            .ok_or_else(|| QuarryError::NotFound(format!("No allowance for minter {} on mint {}", minter, mint)))?;

        if amount > entry.allowance {
            return Err(QuarryError::AllowanceExceeded {
                requested: amount,
                remaining: entry.allowance,
            });
        }
        let total_minted = entry.total_minted.checked_add(amount).ok_or_else(|| {
            QuarryError::InvalidAmount("Minter total_minted overflow".to_string())
        })?;

        entry.allowance -= amount;
        entry.total_minted = total_minted;
        Ok(())
    }

    /// Look up the allowance entry for `minter` on `mint`.
    pub fn allowance(&self, minter: &Pubkey, mint: &Pubkey) -> Option<&Minter> {
        self.minters.get(&minter_address(mint, minter))
    }

    /// Remaining allowance, or 0 when no entry exists.
    pub fn remaining(&self, minter: &Pubkey, mint: &Pubkey) -> u64 {
        self.allowance(minter, mint).map(|m| m.allowance).unwrap_or(0)
    }

    /// Sum of outstanding allowances on `mint`.
    pub fn total_allowance(&self, mint: &Pubkey) -> u128 {
        self.minters
            .values()
            .filter(|m| m.mint == *mint)
            .map(|m| m.allowance as u128)
            .sum()
    }

    /// All entries for `mint`, in index order.
    pub fn minters_for(&self, mint: &Pubkey) -> Vec<&Minter> {
        let mut minters: Vec<&Minter> = self.minters.values().filter(|m| m.mint == *mint).collect();
        minters.sort_by_key(|m| m.index);
        minters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (Pubkey, Pubkey) {
        (Pubkey::new([1u8; 32]), Pubkey::new([2u8; 32]))
    }

    #[test]
    fn test_grant_creates_entry() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        assert_eq!(ledger.grant(&minter, &mint, 100), Ok(0));
        assert_eq!(ledger.remaining(&minter, &mint), 100);
    }

    #[test]
    fn test_grant_increases_existing_entry() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        assert_eq!(ledger.grant(&minter, &mint, 50), Ok(100));
        assert_eq!(ledger.remaining(&minter, &mint), 150);
        assert_eq!(ledger.allowance(&minter, &mint).unwrap().index, 0);
    }

    #[test]
    fn test_grant_overflow() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, u64::MAX).unwrap();
        assert!(matches!(ledger.grant(&minter, &mint, 1), Err(QuarryError::InvalidAmount(_))));
        assert_eq!(ledger.remaining(&minter, &mint), u64::MAX);
    }

    #[test]
    fn test_consume_within_allowance() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        ledger.consume(&minter, &mint, 40).unwrap();
        let entry = ledger.allowance(&minter, &mint).unwrap();
        assert_eq!(entry.allowance, 60);
        assert_eq!(entry.total_minted, 40);
    }

    #[test]
    fn test_consume_exact_allowance() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        ledger.consume(&minter, &mint, 100).unwrap();
        assert_eq!(ledger.remaining(&minter, &mint), 0);
    }

    #[test]
    fn test_consume_exceeding_allowance_leaves_entry_unchanged() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        let result = ledger.consume(&minter, &mint, 150);
        assert_eq!(
            result,
            Err(QuarryError::AllowanceExceeded {
                requested: 150,
                remaining: 100
            })
        );
        let entry = ledger.allowance(&minter, &mint).unwrap();
        assert_eq!(entry.allowance, 100);
        assert_eq!(entry.total_minted, 0);
    }

    #[test]
    fn test_consume_without_entry() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        assert!(matches!(ledger.consume(&minter, &mint, 1), Err(QuarryError::NotFound(_))));
    }

    #[test]
    fn test_set_allowance_overwrites() {
        let (minter, mint) = keys();
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        assert_eq!(ledger.set_allowance(&minter, &mint, 10), 100);
        assert_eq!(ledger.remaining(&minter, &mint), 10);
    }

    #[test]
    fn test_allowances_are_per_mint() {
        let (minter, mint) = keys();
        let other_mint = Pubkey::new([3u8; 32]);
        let other_minter = Pubkey::new([4u8; 32]);
        let mut ledger = AllowanceLedger::new();
        ledger.grant(&minter, &mint, 100).unwrap();
        ledger.grant(&other_minter, &mint, 5).unwrap();
        assert_eq!(ledger.remaining(&minter, &other_mint), 0);
        assert_eq!(ledger.total_allowance(&mint), 105);
        assert_eq!(ledger.minters_for(&mint).len(), 2);
        assert_eq!(ledger.allowance(&other_minter, &mint).unwrap().index, 1);
    }
}
