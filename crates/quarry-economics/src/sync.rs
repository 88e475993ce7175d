// crates/quarry-economics/src/sync.rs
//
// Reward rate synchronizer.
//
// Every quarry under a rewarder gets
//     rate_i = floor(annual_rate * share_i / total_shares)
// and every quarry is recomputed whenever the annual rate or any share
// changes. Synchronization runs in two steps: `plan` computes the new state
// of every quarry and can fail; `apply` writes it and cannot. Callers only
// mutate anything after `plan` succeeds, so a half-synchronized rewarder is
// never observable.
//
// Because each rate is floored, the sum of quarry rates is at most the annual
// rate and falls short of it by less than one unit per quarry.

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;

use crate::payroll::Payroll;
use crate::quarry::{Quarry, QuarryPoolSet};

/// New state for one quarry produced by a synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateUpdate {
    pub quarry: Pubkey,
    pub token_mint: Pubkey,
    pub rewards_share: u64,
    pub annual_rewards_rate: u64,
    /// Payroll checkpoint taken at the old rate before the new rate applies.
    pub rewards_per_token_stored: u128,
    pub last_update_ts: i64,
}

/// `floor(annual_rate * share / total_shares)`, computed in u128.
///
/// Returns 0 when there are no shares, the rate is zero, or the share is zero.
///
/// # Errors
/// `InvalidAmount` if `share > total_shares`.
pub fn compute_rate(annual_rate: u64, share: u64, total_shares: u64) -> Result<u64, QuarryError> {
    if share > total_shares {
        return Err(QuarryError::InvalidAmount(format!(
            "Quarry share {} exceeds total shares {}",
            share, total_shares
        )));
    }
    if total_shares == 0 || annual_rate == 0 || share == 0 {
        return Ok(0);
    }
    let rate = annual_rate as u128 * share as u128 / total_shares as u128;
    // share <= total_shares, so rate <= annual_rate.
    Ok(rate as u64)
}

/// Compute the synchronized state of `quarries` without mutating anything.
///
/// `share_override` substitutes a new share for one quarry, for use when the
/// share change and the resync form one update.
pub fn plan(
    annual_rate: u64,
    total_shares: u64,
    quarries: &[&Quarry],
    share_override: Option<(Pubkey, u64)>,
    now: i64,
) -> Result<Vec<RateUpdate>, QuarryError> {
    quarries
        .iter()
        .map(|quarry| {
            let rewards_share = match share_override {
                Some((key, share)) if key == quarry.key => share,
                _ => quarry.rewards_share,
            };
            let payroll = Payroll::from(*quarry);
            let rewards_per_token_stored = payroll.calculate_reward_per_token(now)?;
            Ok(RateUpdate {
                quarry: quarry.key,
                token_mint: quarry.token_mint,
                rewards_share,
                annual_rewards_rate: compute_rate(annual_rate, rewards_share, total_shares)?,
                rewards_per_token_stored,
                last_update_ts: payroll.last_time_reward_applicable(now),
            })
        })
        .collect()
}

/// Write a successful plan into the pool set.
pub fn apply(pools: &mut QuarryPoolSet, updates: &[RateUpdate]) {
    for update in updates {
        pools.apply_update(update);
    }
}

/// Sum of the annual rates currently assigned to `quarries`.
pub fn distributed_rate(quarries: &[&Quarry]) -> u128 {
    quarries.iter().map(|q| q.annual_rewards_rate as u128).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rate_split_one_to_three() {
        assert_eq!(compute_rate(1_000_000, 1, 4), Ok(250_000));
        assert_eq!(compute_rate(1_000_000, 3, 4), Ok(750_000));
    }

    #[test]
    fn test_zero_total_shares_gives_zero() {
        assert_eq!(compute_rate(1_000_000, 0, 0), Ok(0));
    }

    #[test]
    fn test_zero_annual_rate_gives_zero() {
        assert_eq!(compute_rate(0, 5, 10), Ok(0));
    }

    #[test]
    fn test_share_above_total_rejected() {
        assert!(matches!(compute_rate(100, 2, 1), Err(QuarryError::InvalidAmount(_))));
    }

    #[test]
    fn test_rate_truncates() {
        assert_eq!(compute_rate(10, 1, 3), Ok(3));
        assert_eq!(compute_rate(u64::MAX >> 3, 1, 1), Ok(u64::MAX >> 3));
    }

    proptest! {
        #[test]
        fn test_sum_of_rates_never_exceeds_annual_rate(
            annual_rate in 0..=crate::emission::MAX_ANNUAL_REWARDS_RATE,
            shares in proptest::collection::vec(0u64..=u32::MAX as u64, 1..64),
        ) {
            let total: u64 = shares.iter().sum();
            let mut distributed: u128 = 0;
            for share in &shares {
                distributed += compute_rate(annual_rate, *share, total).unwrap() as u128;
            }
            prop_assert!(distributed <= annual_rate as u128);
            if total > 0 {
                // Each quarry loses less than one unit to truncation.
                prop_assert!((annual_rate as u128) - distributed < shares.len() as u128);
            } else {
                prop_assert_eq!(distributed, 0);
            }
        }
    }
}
