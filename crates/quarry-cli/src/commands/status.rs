// crates/quarry-cli/src/commands/status.rs
//
// `quarry status`: rewarders, quarries, and their synchronized rates.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use quarry_core::identity::Pubkey;
use quarry_economics::emission::annual_to_per_day;
use quarry_economics::program::ProgramState;
use quarry_economics::sync::distributed_rate;
use quarry_ledger::Ledger;

use crate::context::Context;
use crate::output::{format_json, format_table, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusCmd {
    /// Only show this rewarder and its quarries.
    #[arg(long)]
    pub rewarder: Option<Pubkey>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct RewarderRow {
    pub rewarder: String,
    pub authority: String,
    pub mint: String,
    pub annual_rewards_rate: u64,
    /// Sum of the quarries' rates; below the annual rate by truncation.
    pub distributed_rate: u128,
    pub total_rewards_shares: u64,
    pub quarries: u16,
    pub allowance: u64,
}

#[derive(Debug, Serialize, Tabled)]
pub struct QuarryRow {
    pub quarry: String,
    pub rewarder: String,
    pub token_mint: String,
    pub rewards_share: u64,
    pub annual_rewards_rate: u64,
    pub daily_rewards_rate: u64,
    pub total_staked: u64,
    pub miners: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub slot: u64,
    pub now: i64,
    pub rewarders: Vec<RewarderRow>,
    pub quarries: Vec<QuarryRow>,
}

/// Rows for every rewarder matching `filter`, and their quarries.
pub fn build_report(state: &ProgramState, filter: Option<&Pubkey>, slot: u64, now: i64) -> StatusReport {
    let rewarders: Vec<RewarderRow> = state
        .rewarders
        .iter()
        .filter(|r| filter.map_or(true, |key| r.key == *key))
        .map(|r| RewarderRow {
            rewarder: r.key.to_string(),
            authority: r.authority.to_string(),
            mint: r.mint.to_string(),
            annual_rewards_rate: r.annual_rewards_rate,
            distributed_rate: distributed_rate(&state.quarries.quarries_for(&r.key)),
            total_rewards_shares: r.total_rewards_shares,
            quarries: r.num_quarries,
            allowance: state.mints.allowances().remaining(&r.key, &r.mint),
        })
        .collect();

    let quarries = state
        .rewarders
        .iter()
        .filter(|r| filter.map_or(true, |key| r.key == *key))
        .flat_map(|r| state.quarries.quarries_for(&r.key))
        .map(|q| QuarryRow {
            quarry: q.key.to_string(),
            rewarder: q.rewarder.to_string(),
            token_mint: q.token_mint.to_string(),
            rewards_share: q.rewards_share,
            annual_rewards_rate: q.annual_rewards_rate,
            daily_rewards_rate: annual_to_per_day(q.annual_rewards_rate),
            total_staked: q.total_tokens_deposited,
            miners: q.num_miners,
        })
        .collect();

    StatusReport {
        slot,
        now,
        rewarders,
        quarries,
    }
}

pub async fn run(ctx: &Context, cmd: &StatusCmd) -> Result<(), Box<dyn std::error::Error>> {
    let state = ctx.ledger.snapshot().await?;
    let report = build_report(
        &state,
        cmd.rewarder.as_ref(),
        ctx.ledger.slot().await,
        ctx.ledger.now().await?,
    );

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("Slot {} at {}", report.slot, report.now);
            println!();
            println!("Rewarders");
            println!("{}", format_table(&report.rewarders));
            println!();
            println!("Quarries");
            println!("{}", format_table(&report.quarries));
        }
    }
    Ok(())
}
