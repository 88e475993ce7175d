// crates/quarry-economics/src/payroll.rs
//
// Reward accrual for miners, following the Synthetix StakingRewards model.
//
// A quarry stores `rewards_per_token_stored`: the cumulative reward units paid
// per staked token, scaled by 10^token_decimals. Each miner remembers the
// value it was last paid at; the difference times its balance is what it has
// earned since.
//
//   rewards_per_token(now) = stored
//       + elapsed * annual_rate * 10^decimals / (SECONDS_PER_YEAR * total_staked)
//   earned = balance * (rewards_per_token(now) - paid) / 10^decimals + earned_prev
//
// `elapsed` stops at `famine_ts`, after which the quarry accrues nothing.

use std::cmp;

use quarry_core::error::QuarryError;

use crate::emission::SECONDS_PER_YEAR;
use crate::quarry::Quarry;

/// Calculator for the amount of tokens to pay out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payroll {
    /// Timestamp of when rewards should end.
    pub famine_ts: i64,
    /// Timestamp of the last checkpoint.
    pub last_checkpoint_ts: i64,
    /// Reward units emitted to the quarry per year.
    pub annual_rewards_rate: u64,
    /// Reward units paid per staked token, scaled by 10^token_decimals.
    pub rewards_per_token_stored: u128,
    /// Number of decimals on the staked token.
    pub token_decimals: u8,
    /// Total number of tokens deposited into the quarry.
    pub total_tokens_deposited: u128,
}

impl From<&Quarry> for Payroll {
    fn from(quarry: &Quarry) -> Self {
        Self {
            famine_ts: quarry.famine_ts,
            last_checkpoint_ts: quarry.last_update_ts,
            annual_rewards_rate: quarry.annual_rewards_rate,
            rewards_per_token_stored: quarry.rewards_per_token_stored,
            token_decimals: quarry.token_decimals,
            total_tokens_deposited: quarry.total_tokens_deposited as u128,
        }
    }
}

impl Payroll {
    fn calculate_reward_per_token_unsafe(&self, current_ts: i64) -> Option<u128> {
        if self.total_tokens_deposited == 0 {
            return Some(self.rewards_per_token_stored);
        }
        let time_worked = cmp::max(
            0,
            self.last_time_reward_applicable(current_ts)
                .checked_sub(self.last_checkpoint_ts)?,
        );
        // rate < 2^64 and elapsed < 2^63, so the numerator always fits.
        let emitted = (time_worked as u128).checked_mul(self.annual_rewards_rate as u128)?;
        let divisor = (SECONDS_PER_YEAR as u128).checked_mul(self.total_tokens_deposited)?;
        let precise_reward = scale_div(emitted, self.token_decimals, divisor)?;
        self.rewards_per_token_stored.checked_add(precise_reward)
    }

    /// Reward units per staked token at `current_ts`.
    ///
    /// # Errors
    /// `InvalidTimestamp` if `current_ts` is before the last checkpoint,
    /// `InvalidAmount` on arithmetic overflow.
    pub fn calculate_reward_per_token(&self, current_ts: i64) -> Result<u128, QuarryError> {
        self.check_timestamp(current_ts)?;
        self.calculate_reward_per_token_unsafe(current_ts)
            .ok_or_else(|| QuarryError::InvalidAmount("Reward per token overflow".to_string()))
    }

    /// Rewards earned by `tokens_deposited` staked tokens at `current_ts`.
    pub fn calculate_rewards_earned(
        &self,
        current_ts: i64,
        tokens_deposited: u128,
        rewards_per_token_paid: u128,
        rewards_earned: u128,
    ) -> Result<u128, QuarryError> {
        if tokens_deposited > self.total_tokens_deposited {
            return Err(QuarryError::InsufficientBalance {
                requested: tokens_deposited.min(u64::MAX as u128) as u64,
                available: self.total_tokens_deposited.min(u64::MAX as u128) as u64,
            });
        }
        let reward_per_token = self.calculate_reward_per_token(current_ts)?;
        reward_per_token
            .checked_sub(rewards_per_token_paid)
            .and_then(|net| {
                let precision = self.decimal_precision();
                let whole = (net / precision).checked_mul(tokens_deposited)?;
                // remainder < 10^18 and tokens <= u64::MAX
                let frac = (net % precision).checked_mul(tokens_deposited)? / precision;
                whole.checked_add(frac)
            })
            .and_then(|v| v.checked_add(rewards_earned))
            .ok_or_else(|| QuarryError::InvalidAmount("Rewards earned overflow".to_string()))
    }

    /// Rewards stop accruing at `famine_ts`.
    pub fn last_time_reward_applicable(&self, current_ts: i64) -> i64 {
        cmp::min(current_ts, self.famine_ts)
    }

    fn check_timestamp(&self, current_ts: i64) -> Result<(), QuarryError> {
        if current_ts < self.last_checkpoint_ts {
            return Err(QuarryError::InvalidTimestamp(format!(
                "{} is before the last checkpoint {}",
                current_ts, self.last_checkpoint_ts
            )));
        }
        Ok(())
    }

    fn decimal_precision(&self) -> u128 {
        10u128.pow(self.token_decimals as u32)
    }
}

/// `floor(numerator * 10^decimals / divisor)` without forming the full product.
///
/// Long division one decimal digit at a time; the remainder stays below
/// `divisor`, so only a result that does not fit in u128 overflows.
fn scale_div(numerator: u128, decimals: u8, divisor: u128) -> Option<u128> {
    if divisor == 0 {
        return None;
    }
    let mut quotient = numerator / divisor;
    let mut remainder = numerator % divisor;
    for _ in 0..decimals {
        let shifted = remainder.checked_mul(10)?;
        quotient = quotient.checked_mul(10)?.checked_add(shifted / divisor)?;
        remainder = shifted % divisor;
    }
    Some(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emission::MAX_ANNUAL_REWARDS_RATE;

    fn payroll(annual_rewards_rate: u64, total: u128, decimals: u8) -> Payroll {
        Payroll {
            famine_ts: i64::MAX,
            last_checkpoint_ts: 0,
            annual_rewards_rate,
            rewards_per_token_stored: 0,
            token_decimals: decimals,
            total_tokens_deposited: total,
        }
    }

    #[test]
    fn test_rpt_unchanged_when_nothing_deposited() {
        let mut p = payroll(1_000_000, 0, 6);
        p.rewards_per_token_stored = 42;
        assert_eq!(p.calculate_reward_per_token(1_000), Ok(42));
    }

    #[test]
    fn test_rpt_with_zero_rate() {
        let p = payroll(0, 1_000, 6);
        assert_eq!(p.calculate_reward_per_token(SECONDS_PER_YEAR as i64), Ok(0));
    }

    #[test]
    fn test_single_token_full_year_earns_annual_rate() {
        let p = payroll(1_000_000, 1, 0);
        let year = SECONDS_PER_YEAR as i64;
        assert_eq!(p.calculate_reward_per_token(year), Ok(1_000_000));
        assert_eq!(p.calculate_rewards_earned(year, 1, 0, 0), Ok(1_000_000));
    }

    #[test]
    fn test_rewards_split_by_balance() {
        let p = payroll(1_000_000, 4_000_000, 6);
        let year = SECONDS_PER_YEAR as i64;
        assert_eq!(p.calculate_rewards_earned(year, 1_000_000, 0, 0), Ok(250_000));
        assert_eq!(p.calculate_rewards_earned(year, 3_000_000, 0, 0), Ok(750_000));
    }

    #[test]
    fn test_famine_stops_accrual() {
        let mut p = payroll(1_000_000, 1, 0);
        p.famine_ts = (SECONDS_PER_YEAR / 2) as i64;
        let at_famine = p.calculate_reward_per_token(p.famine_ts).unwrap();
        let later = p.calculate_reward_per_token(SECONDS_PER_YEAR as i64 * 3).unwrap();
        assert_eq!(at_famine, 500_000);
        assert_eq!(later, at_famine);
    }

    #[test]
    fn test_famine_before_checkpoint_accrues_nothing() {
        let mut p = payroll(1_000_000, 1, 0);
        p.last_checkpoint_ts = 100;
        p.famine_ts = 50;
        assert_eq!(p.calculate_reward_per_token(1_000), Ok(0));
    }

    #[test]
    fn test_timestamp_before_checkpoint_is_error() {
        let mut p = payroll(1_000_000, 1, 0);
        p.last_checkpoint_ts = 100;
        assert!(matches!(
            p.calculate_reward_per_token(99),
            Err(QuarryError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_earned_more_than_deposited_is_error() {
        let p = payroll(1_000_000, 10, 0);
        assert!(p.calculate_rewards_earned(1, 11, 0, 0).is_err());
    }

    #[test]
    fn test_scale_div_matches_direct_math() {
        assert_eq!(scale_div(7, 0, 2), Some(3));
        assert_eq!(scale_div(7, 2, 3), Some(233));
        assert_eq!(scale_div(1, 18, 1), Some(10u128.pow(18)));
        assert_eq!(scale_div(1, 0, 0), None);
    }

    #[test]
    fn test_max_rate_eighteen_decimals_does_not_overflow() {
        let p = payroll(MAX_ANNUAL_REWARDS_RATE, 1, 18);
        let year = SECONDS_PER_YEAR as i64;
        let expected = MAX_ANNUAL_REWARDS_RATE as u128 * 10u128.pow(18);
        assert_eq!(p.calculate_reward_per_token(year), Ok(expected));
        assert_eq!(p.calculate_reward_per_token(year * 10), Ok(expected * 10));
        assert_eq!(
            p.calculate_rewards_earned(year, 1, 0, 0),
            Ok(MAX_ANNUAL_REWARDS_RATE as u128)
        );
    }

    #[test]
    fn test_large_stake_eighteen_decimals_accrues_over_years() {
        // One whole token staked at 18 decimals, two years at 1e15 per year.
        let p = payroll(1_000_000_000_000_000, 10u128.pow(18), 18);
        let two_years = SECONDS_PER_YEAR as i64 * 2;
        assert_eq!(p.calculate_reward_per_token(two_years), Ok(2_000_000_000_000_000));
        assert_eq!(
            p.calculate_rewards_earned(two_years, 10u128.pow(18), 0, 0),
            Ok(2_000_000_000_000_000)
        );
    }

    #[test]
    fn test_earned_adds_previous_rewards() {
        let p = payroll(1_000_000, 1, 0);
        let year = SECONDS_PER_YEAR as i64;
        assert_eq!(p.calculate_rewards_earned(year, 1, 400_000, 7), Ok(600_007));
    }
}
