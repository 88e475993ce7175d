// crates/quarry-economics/src/emission.rs
//
// Emission constants and time-based conversions of annual reward rates.
//
// A rewarder's `annual_rewards_rate` is the number of reward units emitted
// across all of its quarries per 365-day year. Per-second figures are derived
// from it and only used for display; accrual math keeps the annual rate and
// divides by `SECONDS_PER_YEAR` last to avoid truncating small rates to zero.

/// Seconds in a day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a (365-day) year.
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Maximum number of reward units a rewarder may emit per year.
pub const MAX_ANNUAL_REWARDS_RATE: u64 = u64::MAX >> 3;

/// Per-second rate for an annual rate, truncated.
pub fn annual_to_per_second(annual_rate: u64) -> u64 {
    annual_rate / SECONDS_PER_YEAR
}

/// Per-day rate for an annual rate, truncated.
pub fn annual_to_per_day(annual_rate: u64) -> u64 {
    annual_rate / 365
}
