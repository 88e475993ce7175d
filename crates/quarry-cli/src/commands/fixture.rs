// crates/quarry-cli/src/commands/fixture.rs
//
// `quarry fixture`: stand up a funded rewarder with one quarry.

use clap::Args;

use quarry_sdk::create_rewarder_and_quarry;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Args)]
pub struct FixtureCmd {
    /// Annual rewards rate, in reward base units per year.
    #[arg(long, default_value_t = 1_000_000)]
    pub annual_rate: u64,
}

pub async fn run(ctx: &Context, cmd: &FixtureCmd) -> Result<(), Box<dyn std::error::Error>> {
    let admin = match ctx.wallet() {
        Ok(wallet) => Some(wallet),
        Err(e) => {
            tracing::warn!("{} Using a throwaway admin.", e);
            None
        }
    };
    let outcome = create_rewarder_and_quarry(
        ctx.dyn_ledger(),
        &[],
        cmd.annual_rate,
        admin,
        &ctx.config.rewarder_params(),
    )
    .await;
    let fx = ctx.settle(outcome).await?;

    print_record(
        ctx.format,
        &[
            Field::new("admin", fx.admin.pubkey()),
            Field::new("rewards_mint", fx.rewards_mint),
            Field::new("rewarder", fx.rewarder),
            Field::new("quarry", fx.quarry),
            Field::new("stake_mint", fx.stake_mint),
            Field::new("annual_rewards_rate", fx.quarry_w.data().annual_rewards_rate),
        ],
    );
    Ok(())
}
