// crates/quarry-core/src/events.rs
//
// Events emitted by the reward program. Returned to callers in a
// `Confirmation::Success` and logged by the ledger.

use serde::{Deserialize, Serialize};

use crate::identity::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgramEvent {
    NewMint {
        mint: Pubkey,
        authority: Pubkey,
        decimals: u8,
        hard_cap: Option<u64>,
    },
    MinterAllowanceUpdate {
        mint: Pubkey,
        minter: Pubkey,
        previous_allowance: u64,
        allowance: u64,
    },
    MinterMint {
        mint: Pubkey,
        minter: Pubkey,
        amount: u64,
        destination: Pubkey,
    },
    NewRewarder {
        rewarder: Pubkey,
        authority: Pubkey,
        mint: Pubkey,
        timestamp: i64,
    },
    RewarderAuthorityUpdate {
        rewarder: Pubkey,
        authority: Pubkey,
    },
    RewarderAnnualRewardsUpdate {
        rewarder: Pubkey,
        previous_rate: u64,
        new_rate: u64,
        timestamp: i64,
    },
    QuarryCreate {
        rewarder: Pubkey,
        quarry: Pubkey,
        token_mint: Pubkey,
        index: u16,
        timestamp: i64,
    },
    QuarryRewardsUpdate {
        quarry: Pubkey,
        token_mint: Pubkey,
        annual_rewards_rate: u64,
        rewards_share: u64,
        timestamp: i64,
    },
    MinerCreate {
        quarry: Pubkey,
        miner: Pubkey,
        authority: Pubkey,
    },
    Stake {
        quarry: Pubkey,
        authority: Pubkey,
        amount: u64,
        timestamp: i64,
    },
    Withdraw {
        quarry: Pubkey,
        authority: Pubkey,
        amount: u64,
        timestamp: i64,
    },
    Claim {
        quarry: Pubkey,
        authority: Pubkey,
        amount: u64,
        timestamp: i64,
    },
}
