// crates/quarry-economics/src/miner.rs
//
// Miners: per-staker positions in a quarry.
//
// Every balance change first checkpoints the quarry payroll and credits the
// miner with what it earned at its old balance. Only then does the balance
// move, so rewards always accrue to whoever was staked during each interval.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::{miner_address, Pubkey};

use crate::quarry::{Quarry, QuarryPoolSet};
use crate::rewarder::Rewarder;

/// A staker's position in one quarry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miner {
    pub key: Pubkey,
    /// Quarry this miner stakes in.
    pub quarry: Pubkey,
    /// Owner of the staked tokens and of the rewards.
    pub authority: Pubkey,
    /// Position of the miner among the quarry's miners.
    pub index: u64,
    /// Tokens currently staked.
    pub balance: u64,
    /// Rewards earned and not yet claimed.
    pub rewards_earned: u64,
    /// Quarry rewards-per-token at the miner's last checkpoint.
    pub rewards_per_token_paid: u128,
}

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeAction {
    Stake,
    Withdraw,
}

/// Checkpointed state of a quarry and one of its miners.
struct Checkpoint {
    rewards_per_token_stored: u128,
    last_update_ts: i64,
    annual_rewards_rate: u64,
    rewards_earned: u64,
}

fn checkpoint(rewarder: &Rewarder, quarry: &Quarry, miner: &Miner, now: i64) -> Result<Checkpoint, QuarryError> {
    let annual_rewards_rate = rewarder.compute_quarry_annual_rewards_rate(quarry.rewards_share)?;
    let payroll = quarry.payroll();
    let rewards_per_token_stored = payroll.calculate_reward_per_token(now)?;
    let earned = payroll.calculate_rewards_earned(
        now,
        miner.balance as u128,
        miner.rewards_per_token_paid,
        miner.rewards_earned as u128,
    )?;
    let rewards_earned = u64::try_from(earned)
        .map_err(|_| QuarryError::InvalidAmount("Miner rewards overflow".to_string()))?;
    Ok(Checkpoint {
        rewards_per_token_stored,
        last_update_ts: payroll.last_time_reward_applicable(now),
        annual_rewards_rate,
        rewards_earned,
    })
}

fn apply_checkpoint(quarry: &mut Quarry, miner: &mut Miner, cp: &Checkpoint) {
    quarry.rewards_per_token_stored = cp.rewards_per_token_stored;
    quarry.last_update_ts = cp.last_update_ts;
    quarry.annual_rewards_rate = cp.annual_rewards_rate;
    miner.rewards_earned = cp.rewards_earned;
    miner.rewards_per_token_paid = cp.rewards_per_token_stored;
}

/// All miners, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerSet {
    miners: BTreeMap<Pubkey, Miner>,
}

impl MinerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a position for `authority` in `quarry`.
    ///
    /// # Errors
    /// `NotFound` if the quarry is unknown, `AlreadyExists` if the miner exists.
    pub fn create_miner(
        &mut self,
        pools: &mut QuarryPoolSet,
        quarry: &Pubkey,
        authority: Pubkey,
    ) -> Result<&Miner, QuarryError> {
        let key = miner_address(quarry, &authority);
        if self.miners.contains_key(&key) {
            return Err(QuarryError::AlreadyExists(format!("Miner {}", key)));
        }
        let q = pools.require_mut(quarry)?;
        let index = q.num_miners;
        q.num_miners = index
            .checked_add(1)
            .ok_or_else(|| QuarryError::InvalidAmount("Quarry has too many miners".to_string()))?;

        let miner = Miner {
            key,
            quarry: *quarry,
            authority,
            index,
            balance: 0,
            rewards_earned: 0,
            rewards_per_token_paid: q.rewards_per_token_stored,
        };
        Ok(self.miners.entry(key).or_insert(miner))
    }

    pub fn get(&self, key: &Pubkey) -> Option<&Miner> {
        self.miners.get(key)
    }

    /// Miner of `authority` in `quarry`, failing with `NotFound`.
    pub fn require(&self, quarry: &Pubkey, authority: &Pubkey) -> Result<&Miner, QuarryError> {
        let key = miner_address(quarry, authority);
        self.miners
            .get(&key)
            .ok_or_else(|| QuarryError::NotFound(format!("Miner {}", key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Miner> {
        self.miners.values()
    }

    /// Checkpoint rewards, then stake or withdraw `amount`.
    ///
    /// Only the accounting moves here; token transfers are the caller's job.
    /// A zero amount changes nothing.
    ///
    /// # Errors
    /// `NotFound`, `InsufficientBalance` when withdrawing more than is staked,
    /// `InvalidAmount` on overflow, or any payroll error.
    pub fn process_stake_action(
        &mut self,
        pools: &mut QuarryPoolSet,
        rewarder: &Rewarder,
        quarry: &Pubkey,
        authority: &Pubkey,
        action: StakeAction,
        amount: u64,
        now: i64,
    ) -> Result<(), QuarryError> {
        if amount == 0 {
            return Ok(());
        }
        let key = self.require(quarry, authority)?.key;
        let q = pools.require(quarry)?;
        let miner = &self.miners[&key];
        let cp = checkpoint(rewarder, q, miner, now)?;

        let (balance, total) = match action {
            StakeAction::Stake => (
                miner.balance.checked_add(amount),
                q.total_tokens_deposited.checked_add(amount),
            ),
            StakeAction::Withdraw => {
                if amount > miner.balance {
                    return Err(QuarryError::InsufficientBalance {
                        requested: amount,
                        available: miner.balance,
                    });
                }
                (
                    miner.balance.checked_sub(amount),
                    q.total_tokens_deposited.checked_sub(amount),
                )
            }
        };
        let (balance, total) = balance
            .zip(total)
            .ok_or_else(|| QuarryError::InvalidAmount("Staked balance overflow".to_string()))?;

        let q = pools.require_mut(quarry)?;
        let miner = self.require_mut(&key)?;
        apply_checkpoint(q, miner, &cp);
        miner.balance = balance;
        q.total_tokens_deposited = total;
        Ok(())
    }

    /// Checkpoint rewards and zero the miner's earned rewards.
    ///
    /// Returns the amount to pay out; minting it is the caller's job.
    pub fn claim(
        &mut self,
        pools: &mut QuarryPoolSet,
        rewarder: &Rewarder,
        quarry: &Pubkey,
        authority: &Pubkey,
        now: i64,
    ) -> Result<u64, QuarryError> {
        let key = self.require(quarry, authority)?.key;
        let cp = checkpoint(rewarder, pools.require(quarry)?, &self.miners[&key], now)?;
        let q = pools.require_mut(quarry)?;
        let miner = self.require_mut(&key)?;
        apply_checkpoint(q, miner, &cp);
        let amount = miner.rewards_earned;
        miner.rewards_earned = 0;
        Ok(amount)
    }

    fn require_mut(&mut self, key: &Pubkey) -> Result<&mut Miner, QuarryError> {
        self.miners
            .get_mut(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Miner {}", key)))
    }
}
