// crates/quarry-economics/src/quarry.rs
//
// Quarry pool set: one pool per (rewarder, staked token) pair.
//
// A quarry starts with share 0 and rate 0. Changing its share moves the
// rewarder's total share weight by the delta and resynchronizes every quarry
// under that rewarder in the same step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::{quarry_address, Pubkey};

use crate::emission::annual_to_per_second;
use crate::payroll::Payroll;
use crate::rewarder::Rewarder;
use crate::sync::{self, RateUpdate};
use crate::token::Mint;

/// A pool which distributes its share of a rewarder's emissions to its miners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarry {
    pub key: Pubkey,
    /// Rewarder which manages this quarry.
    pub rewarder: Pubkey,
    /// Token this quarry accepts as stake.
    pub token_mint: Pubkey,
    /// Position of the quarry among its rewarder's quarries.
    pub index: u16,
    /// Decimals of the staked token; sets payroll precision.
    pub token_decimals: u8,
    /// Timestamp when quarry rewards cease.
    pub famine_ts: i64,
    /// Timestamp of the last payroll checkpoint.
    pub last_update_ts: i64,
    /// Rewards per staked token, scaled by 10^token_decimals.
    pub rewards_per_token_stored: u128,
    /// Amount of rewards distributed to the quarry per year.
    pub annual_rewards_rate: u64,
    /// Rewards share allocated to this quarry.
    pub rewards_share: u64,
    /// Total number of tokens staked in the quarry.
    pub total_tokens_deposited: u64,
    /// Number of miners.
    pub num_miners: u64,
}

impl Quarry {
    /// Per-second reward rate, truncated. Display only; accrual uses the annual rate.
    pub fn rewards_rate_per_second(&self) -> u64 {
        annual_to_per_second(self.annual_rewards_rate)
    }

    pub fn payroll(&self) -> Payroll {
        Payroll::from(self)
    }
}

/// All quarries, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarryPoolSet {
    quarries: BTreeMap<Pubkey, Quarry>,
}

impl QuarryPoolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the quarry for `token_mint` under `rewarder`.
    ///
    /// # Errors
    /// `Unauthorized` if `authority` does not control the rewarder,
    /// `DuplicateQuarry` if the pair already has a quarry, `InvalidAmount`
    /// when the rewarder already holds `u16::MAX` quarries.
    pub fn create_quarry(
        &mut self,
        rewarder: &mut Rewarder,
        authority: &Pubkey,
        token_mint: &Mint,
        now: i64,
    ) -> Result<&Quarry, QuarryError> {
        rewarder.assert_authority(authority)?;
        let key = quarry_address(&rewarder.key, &token_mint.key);
        if self.quarries.contains_key(&key) {
            return Err(QuarryError::DuplicateQuarry {
                rewarder: rewarder.key.to_string(),
                token_mint: token_mint.key.to_string(),
            });
        }
        let next_count = rewarder
            .num_quarries
            .checked_add(1)
            .ok_or_else(|| QuarryError::InvalidAmount("Rewarder has too many quarries".to_string()))?;

        let quarry = Quarry {
            key,
            rewarder: rewarder.key,
            token_mint: token_mint.key,
            index: rewarder.num_quarries,
            token_decimals: token_mint.decimals,
            famine_ts: i64::MAX,
            last_update_ts: now,
            rewards_per_token_stored: 0,
            annual_rewards_rate: 0,
            rewards_share: 0,
            total_tokens_deposited: 0,
            num_miners: 0,
        };
        rewarder.num_quarries = next_count;
        Ok(self.quarries.entry(key).or_insert(quarry))
    }

    pub fn get(&self, key: &Pubkey) -> Option<&Quarry> {
        self.quarries.get(key)
    }

    /// Look up a quarry, failing with `NotFound`.
    pub fn require(&self, key: &Pubkey) -> Result<&Quarry, QuarryError> {
        self.quarries
            .get(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Quarry {}", key)))
    }

    pub(crate) fn require_mut(&mut self, key: &Pubkey) -> Result<&mut Quarry, QuarryError> {
        self.quarries
            .get_mut(key)
            .ok_or_else(|| QuarryError::NotFound(format!("Quarry {}", key)))
    }

    /// Quarries of `rewarder`, in creation order.
    pub fn quarries_for(&self, rewarder: &Pubkey) -> Vec<&Quarry> {
        let mut quarries: Vec<&Quarry> = self
            .quarries
            .values()
            .filter(|q| q.rewarder == *rewarder)
            .collect();
        quarries.sort_by_key(|q| q.index);
        quarries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quarry> {
        self.quarries.values()
    }

    /// Set the rewards share of `quarry` and resynchronize all quarries of `rewarder`.
    ///
    /// Returns the applied updates. Nothing changes on error.
    ///
    /// # Errors
    /// `NotFound` if the quarry does not belong to `rewarder`, `Unauthorized`,
    /// `InvalidAmount` if the total share weight would overflow.
    pub fn set_share(
        &mut self,
        rewarder: &mut Rewarder,
        quarry: &Pubkey,
        authority: &Pubkey,
        new_share: u64,
        now: i64,
    ) -> Result<Vec<RateUpdate>, QuarryError> {
        rewarder.assert_authority(authority)?;
        let current = self.require(quarry)?;
        if current.rewarder != rewarder.key {
            return Err(QuarryError::NotFound(format!(
                "Quarry {} under rewarder {}",
                quarry, rewarder.key
            )));
        }

        let new_total = rewarder
            .total_rewards_shares
            .checked_sub(current.rewards_share)
            .and_then(|v| v.checked_add(new_share))
            .ok_or_else(|| {
                QuarryError::InvalidAmount(format!("Total rewards shares overflow setting share {}", new_share))
            })?;

        let updates = sync::plan(
            rewarder.annual_rewards_rate,
            new_total,
            &self.quarries_for(&rewarder.key),
            Some((*quarry, new_share)),
            now,
        )?;

        rewarder.total_rewards_shares = new_total;
        sync::apply(self, &updates);
        Ok(updates)
    }

    /// Set the time after which `quarry` stops accruing rewards.
    ///
    /// The payroll is checkpointed first so that rewards earned before the
    /// change are kept.
    pub fn set_famine(
        &mut self,
        rewarder: &Rewarder,
        quarry: &Pubkey,
        authority: &Pubkey,
        famine_ts: i64,
        now: i64,
    ) -> Result<(), QuarryError> {
        rewarder.assert_authority(authority)?;
        let update = self.checkpoint(rewarder, quarry, now)?;
        self.apply_update(&update);
        self.require_mut(quarry)?.famine_ts = famine_ts;
        Ok(())
    }

    /// Checkpoint `quarry`'s payroll at `now` and recompute its rate from `rewarder`.
    pub fn update_rewards(&mut self, rewarder: &Rewarder, quarry: &Pubkey, now: i64) -> Result<RateUpdate, QuarryError> {
        let update = self.checkpoint(rewarder, quarry, now)?;
        self.apply_update(&update);
        Ok(update)
    }

    fn checkpoint(&self, rewarder: &Rewarder, quarry: &Pubkey, now: i64) -> Result<RateUpdate, QuarryError> {
        let current = self.require(quarry)?;
        if current.rewarder != rewarder.key {
            return Err(QuarryError::NotFound(format!(
                "Quarry {} under rewarder {}",
                quarry, rewarder.key
            )));
        }
        let mut updates = sync::plan(
            rewarder.annual_rewards_rate,
            rewarder.total_rewards_shares,
            &[current],
            None,
            now,
        )?;
        updates
            .pop()
            .ok_or_else(|| QuarryError::NotFound(format!("Quarry {}", quarry)))
    }

    pub(crate) fn apply_update(&mut self, update: &RateUpdate) {
        if let Some(q) = self.quarries.get_mut(&update.quarry) {
            q.rewards_share = update.rewards_share;
            q.annual_rewards_rate = update.annual_rewards_rate;
            q.rewards_per_token_stored = update.rewards_per_token_stored;
            q.last_update_ts = update.last_update_ts;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::{MAX_ANNUAL_REWARDS_RATE, SECONDS_PER_YEAR};
    use crate::rewarder::RewarderRegistry;
    use proptest::prelude::*;

    const ADMIN: Pubkey = Pubkey::new([1u8; 32]);
    const OTHER: Pubkey = Pubkey::new([2u8; 32]);

    fn token(seed: u8) -> Mint {
        Mint::new(Pubkey::new([seed; 32]), ADMIN, 6, None).unwrap()
    }

    fn rewarder() -> Rewarder {
        let mut registry = RewarderRegistry::new();
        registry
            .create_rewarder(Pubkey::new_unique(), ADMIN, &token(100), 0)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_create_quarry_initial_state() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        let q = pools.create_quarry(&mut r, &ADMIN, &token(1), 10).unwrap().clone();
        assert_eq!(q.rewards_share, 0);
        assert_eq!(q.annual_rewards_rate, 0);
        assert_eq!(q.index, 0);
        assert_eq!(q.last_update_ts, 10);
        assert_eq!(q.famine_ts, i64::MAX);
        assert_eq!(r.num_quarries, 1);
    }

    #[test]
    fn test_create_quarry_duplicate() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap();
        let result = pools.create_quarry(&mut r, &ADMIN, &token(1), 0);
        assert!(matches!(result, Err(QuarryError::DuplicateQuarry { .. })));
        assert_eq!(r.num_quarries, 1);
    }

    #[test]
    fn test_create_quarry_unauthorized() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        let result = pools.create_quarry(&mut r, &OTHER, &token(1), 0);
        assert!(matches!(result, Err(QuarryError::Unauthorized(_))));
        assert_eq!(pools.iter().count(), 0);
    }

    #[test]
    fn test_set_share_resyncs_siblings() {
        let mut r = rewarder();
        r.annual_rewards_rate = 1_000_000;
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        let b = pools.create_quarry(&mut r, &ADMIN, &token(2), 0).unwrap().key;

        pools.set_share(&mut r, &a, &ADMIN, 1, 0).unwrap();
        assert_eq!(pools.require(&a).unwrap().annual_rewards_rate, 1_000_000);

        pools.set_share(&mut r, &b, &ADMIN, 3, 0).unwrap();
        assert_eq!(r.total_rewards_shares, 4);
        assert_eq!(pools.require(&a).unwrap().annual_rewards_rate, 250_000);
        assert_eq!(pools.require(&b).unwrap().annual_rewards_rate, 750_000);
    }

    #[test]
    fn test_set_share_updates_total_by_delta() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        pools.set_share(&mut r, &a, &ADMIN, 10, 0).unwrap();
        pools.set_share(&mut r, &a, &ADMIN, 4, 0).unwrap();
        assert_eq!(r.total_rewards_shares, 4);
        pools.set_share(&mut r, &a, &ADMIN, 0, 0).unwrap();
        assert_eq!(r.total_rewards_shares, 0);
    }

    #[test]
    fn test_set_share_unauthorized_changes_nothing() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        let before = pools.clone();
        let result = pools.set_share(&mut r, &a, &OTHER, 5, 0);
        assert!(matches!(result, Err(QuarryError::Unauthorized(_))));
        assert_eq!(pools, before);
        assert_eq!(r.total_rewards_shares, 0);
    }

    #[test]
    fn test_set_share_overflow() {
        let mut r = rewarder();
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        let b = pools.create_quarry(&mut r, &ADMIN, &token(2), 0).unwrap().key;
        pools.set_share(&mut r, &a, &ADMIN, u64::MAX, 0).unwrap();
        let result = pools.set_share(&mut r, &b, &ADMIN, 1, 0);
        assert!(matches!(result, Err(QuarryError::InvalidAmount(_))));
        assert_eq!(pools.require(&b).unwrap().rewards_share, 0);
    }

    #[test]
    fn test_set_share_on_foreign_quarry() {
        let mut r = rewarder();
        let mut other = rewarder();
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        let result = pools.set_share(&mut other, &a, &ADMIN, 1, 0);
        assert!(matches!(result, Err(QuarryError::NotFound(_))));
    }

    #[test]
    fn test_set_famine_checkpoints_first() {
        let mut r = rewarder();
        r.annual_rewards_rate = 1_000_000;
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        pools.set_share(&mut r, &a, &ADMIN, 1, 0).unwrap();
        pools.require_mut(&a).unwrap().total_tokens_deposited = 1_000_000;

        let half_year = (SECONDS_PER_YEAR / 2) as i64;
        pools.set_famine(&r, &a, &ADMIN, half_year, half_year).unwrap();
        let q = pools.require(&a).unwrap();
        assert_eq!(q.famine_ts, half_year);
        assert_eq!(q.last_update_ts, half_year);
        assert_eq!(q.rewards_per_token_stored, 500_000);
    }

    #[test]
    fn test_rate_per_second() {
        let mut r = rewarder();
        r.annual_rewards_rate = SECONDS_PER_YEAR * 3;
        let mut pools = QuarryPoolSet::new();
        let a = pools.create_quarry(&mut r, &ADMIN, &token(1), 0).unwrap().key;
        pools.set_share(&mut r, &a, &ADMIN, 1, 0).unwrap();
        assert_eq!(pools.require(&a).unwrap().rewards_rate_per_second(), 3);
    }

    #[derive(Debug, Clone)]
    enum Update {
        Share(usize, u64),
        Rate(u64),
    }

    fn update() -> impl Strategy<Value = Update> {
        prop_oneof![
            (0usize..4, 0u64..=u32::MAX as u64).prop_map(|(i, share)| Update::Share(i, share)),
            (0..=MAX_ANNUAL_REWARDS_RATE).prop_map(Update::Rate),
        ]
    }

    proptest! {
        #[test]
        fn test_share_and_rate_updates_keep_totals_consistent(
            updates in proptest::collection::vec(update(), 1..40),
        ) {
            let mut registry = RewarderRegistry::new();
            let key = registry
                .create_rewarder(Pubkey::new_unique(), ADMIN, &token(100), 0)
                .unwrap()
                .key;
            let mut pools = QuarryPoolSet::new();
            let mut quarries = Vec::new();
            for seed in 1..=4u8 {
                let r = registry.require_mut(&key).unwrap();
                quarries.push(pools.create_quarry(r, &ADMIN, &token(seed), 0).unwrap().key);
            }

            for (step, update) in updates.iter().enumerate() {
                let now = step as i64;
                match update {
                    Update::Share(i, share) => {
                        let r = registry.require_mut(&key).unwrap();
                        pools.set_share(r, &quarries[*i], &ADMIN, *share, now).unwrap();
                    }
                    Update::Rate(rate) => {
                        registry.set_annual_rate(&key, &ADMIN, *rate, &mut pools, now).unwrap();
                    }
                }
                let r = registry.require(&key).unwrap();
                let under = pools.quarries_for(&key);
                let share_sum: u64 = under.iter().map(|q| q.rewards_share).sum();
                prop_assert_eq!(r.total_rewards_shares, share_sum);
                prop_assert!(sync::distributed_rate(&under) <= r.annual_rewards_rate as u128);
            }
        }
    }
}
