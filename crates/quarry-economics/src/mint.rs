// crates/quarry-economics/src/mint.rs
//
// Mint authority: registers mints, holds token balances, and issues tokens
// against the allowance ledger.
//
// Every check in `mint_to` runs before any state is written, so a failed mint
// never consumes allowance or moves supply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::{token_account_address, Pubkey};

use crate::allowance::AllowanceLedger;
use crate::token::Mint;

/// Balance of one owner in one mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Registry of mints, token accounts, and minter allowances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAuthority {
    mints: BTreeMap<Pubkey, Mint>,
    token_accounts: BTreeMap<Pubkey, TokenAccount>,
    allowances: AllowanceLedger,
}

impl MintAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mint at `key` with `0 <= decimals <= 18` and an optional hard cap.
    ///
    /// # Errors
    /// `InvalidDecimals` for decimals above 18, `AlreadyExists` if `key` is taken.
    pub fn create_mint(
        &mut self,
        key: Pubkey,
        authority: Pubkey,
        decimals: u8,
        hard_cap: Option<u64>,
    ) -> Result<&Mint, QuarryError> {
        let mint = Mint::new(key, authority, decimals, hard_cap)?;
        if self.mints.contains_key(&key) {
            return Err(QuarryError::AlreadyExists(format!("Mint {}", key)));
        }
        Ok(self.mints.entry(key).or_insert(mint))
    }

    pub fn mint(&self, key: &Pubkey) -> Option<&Mint> {
        self.mints.get(key)
    }

    /// Look up a mint, failing with `NotFound`.
    pub fn require_mint(&self, key: &Pubkey) -> Result<&Mint, QuarryError> {
        self.mints
            .get(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Mint {}", key)))
    }

    pub fn mints(&self) -> impl Iterator<Item = &Mint> {
        self.mints.values()
    }

    pub fn allowances(&self) -> &AllowanceLedger {
        &self.allowances
    }

    fn require_mint_authority(&self, mint: &Pubkey, authority: &Pubkey) -> Result<(), QuarryError> {
        let mint = self.require_mint(mint)?;
        if mint.authority != *authority {
            return Err(QuarryError::Unauthorized(format!(
                "{} is not the authority of mint {}",
                authority, mint.key
            )));
        }
        Ok(())
    }

    /// Increase `minter`'s allowance on `mint`. Only the mint authority may grant.
    ///
    /// Returns the previous allowance.
    pub fn grant(
        &mut self,
        authority: &Pubkey,
        minter: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<u64, QuarryError> {
        self.require_mint_authority(mint, authority)?;
        self.allowances.grant(minter, mint, amount)
    }

    /// Overwrite `minter`'s allowance on `mint`. Only the mint authority may set it.
    ///
    /// Returns the previous allowance.
    pub fn set_allowance(
        &mut self,
        authority: &Pubkey,
        minter: &Pubkey,
        mint: &Pubkey,
        allowance: u64,
    ) -> Result<u64, QuarryError> {
        self.require_mint_authority(mint, authority)?;
        Ok(self.allowances.set_allowance(minter, mint, allowance))
    }

    /// Mint `amount` of `mint` to `destination`, consuming `minter`'s allowance.
    ///
    /// # Errors
    /// `NotFound` (mint or allowance), `AllowanceExceeded`, `HardcapExceeded`.
    pub fn mint_to(
        &mut self,
        destination: &Pubkey,
        mint: &Pubkey,
        amount: u64,
        minter: &Pubkey,
    ) -> Result<(), QuarryError> {
        let new_supply = self.require_mint(mint)?.supply_after_mint(amount)?;
        let new_balance = self
            .balance(destination, mint)
            .checked_add(amount)
            .ok_or_else(|| QuarryError::InvalidAmount("Token balance overflow".to_string()))?;

        self.allowances.consume(minter, mint, amount)?;

        if let Some(m) = self.mints.get_mut(mint) {
            m.supply = new_supply;
        }
        self.account_mut(destination, mint).amount = new_balance;
        Ok(())
    }

    /// Move `amount` of `mint` from `owner` to `destination`.
    ///
    /// # Errors
    /// `NotFound` if the mint is unknown, `InsufficientBalance` on shortfall.
    pub fn transfer(
        &mut self,
        owner: &Pubkey,
        destination: &Pubkey,
        mint: &Pubkey,
        amount: u64,
    ) -> Result<(), QuarryError> {
        self.require_mint(mint)?;
        let available = self.balance(owner, mint);
        if amount > available {
            return Err(QuarryError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if owner == destination {
            return Ok(());
        }
        let new_destination = self
            .balance(destination, mint)
            .checked_add(amount)
            .ok_or_else(|| QuarryError::InvalidAmount("Token balance overflow".to_string()))?;

        self.account_mut(owner, mint).amount = available - amount;
        self.account_mut(destination, mint).amount = new_destination;
        Ok(())
    }

    /// Balance of `owner` in `mint` (0 if the account was never touched).
    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        self.token_accounts
            .get(&token_account_address(owner, mint))
            .map(|a| a.amount)
            .unwrap_or(0)
    }

    fn account_mut(&mut self, owner: &Pubkey, mint: &Pubkey) -> &mut TokenAccount {
        self.token_accounts
            .entry(token_account_address(owner, mint))
            .or_insert_with(|| TokenAccount {
                owner: *owner,
                mint: *mint,
                amount: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        authority: MintAuthority,
        admin: Pubkey,
        minter: Pubkey,
        mint: Pubkey,
        user: Pubkey,
    }

    fn setup(hard_cap: Option<u64>) -> Fixture {
        let admin = Pubkey::new([1u8; 32]);
        let minter = Pubkey::new([2u8; 32]);
        let mint = Pubkey::new([3u8; 32]);
        let user = Pubkey::new([4u8; 32]);
        let mut authority = MintAuthority::new();
        authority.create_mint(mint, admin, 6, hard_cap).unwrap();
        Fixture {
            authority,
            admin,
            minter,
            mint,
            user,
        }
    }

    #[test]
    fn test_create_mint_invalid_decimals() {
        let mut authority = MintAuthority::new();
        let result = authority.create_mint(Pubkey::new([1u8; 32]), Pubkey::default(), 19, None);
        assert_eq!(result.err(), Some(QuarryError::InvalidDecimals(19)));
        assert!(authority.mint(&Pubkey::new([1u8; 32])).is_none());
    }

    #[test]
    fn test_create_mint_twice() {
        let mut f = setup(None);
        let result = f.authority.create_mint(f.mint, f.admin, 6, None);
        assert!(matches!(result, Err(QuarryError::AlreadyExists(_))));
    }

    #[test]
    fn test_mint_to_increases_balance_and_supply() {
        let mut f = setup(None);
        f.authority.grant(&f.admin, &f.minter, &f.mint, 1_000).unwrap();
        f.authority.mint_to(&f.user, &f.mint, 400, &f.minter).unwrap();

        assert_eq!(f.authority.balance(&f.user, &f.mint), 400);
        assert_eq!(f.authority.mint(&f.mint).unwrap().supply, 400);
        assert_eq!(f.authority.allowances().remaining(&f.minter, &f.mint), 600);
    }

    #[test]
    fn test_mint_to_without_allowance() {
        let mut f = setup(None);
        let result = f.authority.mint_to(&f.user, &f.mint, 1, &f.minter);
        assert!(matches!(result, Err(QuarryError::NotFound(_))));
        assert_eq!(f.authority.mint(&f.mint).unwrap().supply, 0);
    }

    #[test]
    fn test_mint_to_exceeding_allowance_changes_nothing() {
        let mut f = setup(None);
        f.authority.grant(&f.admin, &f.minter, &f.mint, 100).unwrap();
        let result = f.authority.mint_to(&f.user, &f.mint, 150, &f.minter);
        assert!(matches!(result, Err(QuarryError::AllowanceExceeded { .. })));
        assert_eq!(f.authority.balance(&f.user, &f.mint), 0);
        assert_eq!(f.authority.mint(&f.mint).unwrap().supply, 0);
        assert_eq!(f.authority.allowances().remaining(&f.minter, &f.mint), 100);
    }

    #[test]
    fn test_mint_to_over_hard_cap_keeps_allowance() {
        let mut f = setup(Some(500));
        f.authority.grant(&f.admin, &f.minter, &f.mint, 1_000).unwrap();
        let result = f.authority.mint_to(&f.user, &f.mint, 501, &f.minter);
        assert!(matches!(result, Err(QuarryError::HardcapExceeded { .. })));
        assert_eq!(f.authority.allowances().remaining(&f.minter, &f.mint), 1_000);
    }

    #[test]
    fn test_grant_requires_mint_authority() {
        let mut f = setup(None);
        let result = f.authority.grant(&f.user, &f.minter, &f.mint, 100);
        assert!(matches!(result, Err(QuarryError::Unauthorized(_))));
    }

    #[test]
    fn test_transfer() {
        let mut f = setup(None);
        f.authority.grant(&f.admin, &f.minter, &f.mint, 100).unwrap();
        f.authority.mint_to(&f.user, &f.mint, 100, &f.minter).unwrap();
        f.authority.transfer(&f.user, &f.admin, &f.mint, 30).unwrap();
        assert_eq!(f.authority.balance(&f.user, &f.mint), 70);
        assert_eq!(f.authority.balance(&f.admin, &f.mint), 30);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut f = setup(None);
        let result = f.authority.transfer(&f.user, &f.admin, &f.mint, 1);
        assert_eq!(
            result,
            Err(QuarryError::InsufficientBalance {
                requested: 1,
                available: 0
            })
        );
    }
}
