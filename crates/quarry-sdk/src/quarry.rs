// crates/quarry-sdk/src/quarry.rs
//
// QuarryWrapper: a loaded quarry, the authority's share and famine controls,
// and the miner operations of the SDK wallet.

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::Instruction;
use quarry_economics::miner::Miner;
use quarry_economics::quarry::Quarry;

use crate::envelope::TransactionEnvelope;
use crate::sdk::QuarrySdk;

#[derive(Debug, Clone)]
pub struct QuarryWrapper {
    sdk: QuarrySdk,
    key: Pubkey,
    token_mint: Pubkey,
    data: Quarry,
}

impl QuarryWrapper {
    /// Load the quarry at `key`, which must stake `token_mint`.
    pub async fn load(sdk: QuarrySdk, token_mint: &Pubkey, key: &Pubkey) -> Result<Self, QuarryError> {
        let data = sdk.state().await?.quarries.require(key)?.clone();
        if data.token_mint != *token_mint {
            return Err(QuarryError::NotFound(format!(
                "Quarry {} does not stake token {}",
                key, token_mint
            )));
        }
        Ok(Self {
            sdk,
            key: *key,
            token_mint: *token_mint,
            data,
        })
    }

    pub async fn reload(&mut self) -> Result<(), QuarryError> {
        self.data = self.sdk.state().await?.quarries.require(&self.key)?.clone();
        Ok(())
    }

    pub fn key(&self) -> Pubkey {
        self.key
    }

    pub fn token_mint(&self) -> Pubkey {
        self.token_mint
    }

    pub fn data(&self) -> &Quarry {
        &self.data
    }

    /// Set this quarry's share of its rewarder's emissions.
    pub fn set_rewards_share(&self, share: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::SetRewardsShare {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
            share,
        }])
    }

    pub fn set_famine(&self, famine_ts: i64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::SetFamine {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
            famine_ts,
        }])
    }

    /// Open a miner for the wallet.
    pub fn create_miner(&self) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::CreateMiner {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
        }])
    }

    pub fn stake(&self, amount: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::StakeTokens {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
            amount,
        }])
    }

    pub fn withdraw(&self, amount: u64) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::WithdrawTokens {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
            amount,
        }])
    }

    /// Claim the wallet's earned rewards.
    pub fn claim(&self) -> TransactionEnvelope {
        self.sdk.envelope(vec![Instruction::ClaimRewards {
            quarry: self.key,
            authority: self.sdk.wallet_key(),
        }])
    }

    /// Miner of `authority` in this quarry, if one was created.
    pub async fn fetch_miner(&self, authority: &Pubkey) -> Result<Option<Miner>, QuarryError> {
        Ok(self.sdk.state().await?.miner(&self.key, authority).cloned())
    }
}
