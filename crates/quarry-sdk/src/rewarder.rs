// crates/quarry-sdk/src/rewarder.rs
//
// RewarderWrapper: a loaded rewarder plus the transactions its authority can
// issue. The loaded data is a snapshot; call `reload` after confirming
// changes.

use quarry_core::error::QuarryError;
use quarry_core::identity::{quarry_address, Pubkey};
use quarry_core::transaction::Instruction;
use quarry_economics::quarry::Quarry;
use quarry_economics::rewarder::Rewarder;

use crate::envelope::TransactionEnvelope;
use crate::quarry::QuarryWrapper;
use crate::sdk::QuarrySdk;

#[derive(Debug, Clone)]
pub struct RewarderWrapper {
    sdk: QuarrySdk,
    key: Pubkey,
    data: Rewarder,
}

impl RewarderWrapper {
    /// Load `key` from the ledger, failing with `NotFound`.
    pub async fn load(sdk: QuarrySdk, key: &Pubkey) -> Result<Self, QuarryError> {
        let data = sdk.state().await?.rewarders.require(key)?.clone();
        Ok(Self { sdk, key: *key, data })
    }

    pub async fn reload(&mut self) -> Result<(), QuarryError> {
        self.data = self.sdk.state().await?.rewarders.require(&self.key)?.clone();
        Ok(())
    }

    pub fn rewarder_key(&self) -> Pubkey {
        self.key
    }

    pub fn data(&self) -> &Rewarder {
        &self.data
    }

    pub fn sdk(&self) -> &QuarrySdk {
        &self.sdk
    }

    /// Address of this rewarder's quarry for `token_mint`.
    pub fn quarry_key(&self, token_mint: &Pubkey) -> Pubkey {
        quarry_address(&self.key, token_mint)
    }

    /// Create a quarry for `token_mint`. Returns the envelope and the quarry's key.
    pub fn create_quarry(&self, token_mint: &Pubkey) -> (TransactionEnvelope, Pubkey) {
        let tx = self.sdk.envelope(vec![Instruction::CreateQuarry {
            rewarder: self.key,
            authority: self.sdk.wallet_key(),
            token_mint: *token_mint,
        }]);
        (tx, self.quarry_key(token_mint))
    }

    /// Set the annual rate. Every quarry is resynchronized in the same instruction.
    pub fn set_annual_rewards(&self, rate: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::SetAnnualRewards {
            rewarder: self.key,
            authority: self.sdk.wallet_key(),
            rate,
        }])
    }

    /// Set the annual rate, then checkpoint the quarries of `token_mints`.
    ///
    /// Mints without a quarry under this rewarder are skipped.
    pub async fn set_and_sync_annual_rewards(
        &self,
        rate: u64,
        token_mints: &[Pubkey],
    ) -> Result<TransactionEnvelope, QuarryError> {
        let state = self.sdk.state().await?;
        let mut instructions = vec![Instruction::SetAnnualRewards {
            rewarder: self.key,
            authority: self.sdk.wallet_key(),
            rate,
        }];
        for mint in token_mints {
            let quarry = self.quarry_key(mint);
            if state.quarry(&quarry).is_none() {
                tracing::warn!("No quarry for token {} under rewarder {}, skipping sync", mint, self.key);
                continue;
            }
            instructions.push(Instruction::UpdateQuarryRewards { quarry });
        }
        Ok(self.sdk.envelope(instructions))
    }

    /// Propose `new_authority`; it takes effect once accepted.
    pub fn transfer_authority(&self, new_authority: &Pubkey) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::TransferAuthority {
            rewarder: self.key,
            authority: self.sdk.wallet_key(),
            new_authority: *new_authority,
        }])
    }

    /// Accept a pending transfer. The SDK wallet must be the pending authority.
    pub fn accept_authority(&self) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::AcceptAuthority {
            rewarder: self.key,
            new_authority: self.sdk.wallet_key(),
        }])
    }

    /// Load the quarry for `token_mint`.
    pub async fn get_quarry(&self, token_mint: &Pubkey) -> Result<QuarryWrapper, QuarryError> {
        QuarryWrapper::load(self.sdk.clone(), token_mint, &self.quarry_key(token_mint)).await
    }

    /// Current state of every quarry under this rewarder, in creation order.
    pub async fn quarries(&self) -> Result<Vec<Quarry>, QuarryError> {
        let state = self.sdk.state().await?;
        let quarries = state.quarries.quarries_for(&self.key).into_iter().cloned().collect();
        Ok(quarries)
    }
}
