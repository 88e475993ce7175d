// crates/quarry-sdk/src/mint_wrapper.rs
//
// Client for mints and minter allowances. The SDK wallet is the mint
// authority for every mint it creates.

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::Instruction;
use quarry_economics::allowance::Minter;
use quarry_economics::token::Mint;

use crate::envelope::TransactionEnvelope;
use crate::sdk::QuarrySdk;

#[derive(Debug, Clone)]
pub struct MintWrapperClient {
    sdk: QuarrySdk,
}

impl MintWrapperClient {
    pub fn new(sdk: QuarrySdk) -> Self {
        Self { sdk }
    }

    /// Create a fresh mint controlled by the wallet.
    ///
    /// Returns the envelope and the new mint's key.
    pub fn new_wrapper_and_mint(&self, decimals: u8, hard_cap: Option<u64>) -> (TransactionEnvelope, Pubkey) {
        let mint = Pubkey::new_unique();
        let tx = self.sdk.envelope(vec![Instruction::CreateMint {
            mint,
            authority: self.sdk.wallet_key(),
            decimals,
            hard_cap,
        }]);
        (tx, mint)
    }

    /// Register `minter` on `mint` with exactly `allowance` remaining.
    pub fn new_minter_with_allowance(&self, mint: &Pubkey, minter: &Pubkey, allowance: u64) -> TransactionEnvelope {
        self.minter_update(mint, minter, allowance)
    }

    /// Overwrite `minter`'s remaining allowance on `mint`.
    pub fn minter_update(&self, mint: &Pubkey, minter: &Pubkey, allowance: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::SetAllowance {
            mint: *mint,
            authority: self.sdk.wallet_key(),
            minter: *minter,
            allowance,
        }])
    }

    /// Add `amount` to `minter`'s allowance on `mint`.
    pub fn grant(&self, mint: &Pubkey, minter: &Pubkey, amount: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::GrantAllowance {
            mint: *mint,
            authority: self.sdk.wallet_key(),
            minter: *minter,
            amount,
        }])
    }

    /// Mint `amount` to `destination` against the wallet's own allowance.
    pub fn perform_mint(&self, mint: &Pubkey, destination: &Pubkey, amount: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::MintTo {
            mint: *mint,
            minter: self.sdk.wallet_key(),
            destination: *destination,
            amount,
        }])
    }

    pub async fn fetch_mint(&self, mint: &Pubkey) -> Result<Mint, QuarryError> {
        let state = self.sdk.state().await?;
        state.mints.require_mint(mint).cloned()
    }

    pub async fn fetch_minter(&self, mint: &Pubkey, minter: &Pubkey) -> Result<Option<Minter>, QuarryError> {
        let state = self.sdk.state().await?;
        Ok(state.mints.allowances().allowance(minter, mint).cloned())
    }

    /// Token balance of `owner` in `mint`.
    pub async fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64, QuarryError> {
        Ok(self.sdk.state().await?.balance(owner, mint))
    }
}
