// crates/quarry-economics/src/lib.rs
//
// Reward accounting for the Quarry liquidity mining engine: mint allowances,
// rewarders, quarry pools, rate synchronization, and miner payroll.

pub mod allowance;
pub mod emission;
pub mod miner;
pub mod mint;
pub mod payroll;
pub mod program;
pub mod quarry;
pub mod rewarder;
pub mod sync;
pub mod token;

pub use allowance::{AllowanceLedger, Minter};
pub use emission::{MAX_ANNUAL_REWARDS_RATE, SECONDS_PER_DAY, SECONDS_PER_YEAR};
pub use miner::{Miner, MinerSet, StakeAction};
pub use mint::{MintAuthority, TokenAccount};
pub use payroll::Payroll;
pub use program::ProgramState;
pub use quarry::{Quarry, QuarryPoolSet};
pub use rewarder::{Rewarder, RewarderRegistry};
pub use sync::RateUpdate;
pub use token::{Mint, TokenAmount, MAX_DECIMALS};
