// crates/quarry-sdk/src/mine.rs

use quarry_core::error::QuarryError;
use quarry_core::identity::{rewarder_address, Pubkey};
use quarry_core::transaction::Instruction;

use crate::envelope::TransactionEnvelope;
use crate::rewarder::RewarderWrapper;
use crate::sdk::QuarrySdk;

/// Client for creating and loading rewarders.
#[derive(Debug, Clone)]
pub struct MineClient {
    sdk: QuarrySdk,
}

impl MineClient {
    pub fn new(sdk: QuarrySdk) -> Self {
        Self { sdk }
    }

    /// Create a rewarder for `mint` with the wallet as authority.
    ///
    /// Every call uses a fresh base, so every call creates a new rewarder.
    /// Returns the envelope and the rewarder's key.
    pub fn create_rewarder(&self, mint: &Pubkey) -> (TransactionEnvelope, Pubkey) {
        let base = Pubkey::new_unique();
        let tx = self.sdk.envelope(vec![Instruction::CreateRewarder {
            base,
            authority: self.sdk.wallet_key(),
            mint: *mint,
        }]);
        (tx, rewarder_address(&base))
    }

    pub async fn load_rewarder_wrapper(&self, rewarder: &Pubkey) -> Result<RewarderWrapper, QuarryError> {
        RewarderWrapper::load(self.sdk.clone(), rewarder).await
    }
}
