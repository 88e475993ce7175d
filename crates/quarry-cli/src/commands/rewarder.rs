// crates/quarry-cli/src/commands/rewarder.rs
//
// `quarry rewarder {create, set-rate}`.

use clap::Subcommand;

use quarry_core::identity::Pubkey;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Subcommand)]
pub enum RewarderCmd {
    /// Create a rewarder for a reward mint, with the wallet as authority.
    Create {
        #[arg(long)]
        mint: Pubkey,
    },
    /// Set the annual rewards rate and resync every quarry.
    SetRate {
        #[arg(long)]
        rewarder: Pubkey,
        /// Reward units per year.
        #[arg(long)]
        rate: u64,
    },
}

pub async fn run(ctx: &Context, cmd: &RewarderCmd) -> Result<(), Box<dyn std::error::Error>> {
    let sdk = ctx.sdk()?;
    match cmd {
        RewarderCmd::Create { mint } => {
            let (tx, rewarder) = sdk.mine().create_rewarder(mint);
            let confirmed = ctx.settle(tx.confirm().await).await?;
            print_record(
                ctx.format,
                &[
                    Field::new("rewarder", rewarder),
                    Field::new("mint", mint),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
        RewarderCmd::SetRate { rewarder, rate } => {
            let mut wrapper = sdk.mine().load_rewarder_wrapper(rewarder).await?;
            let previous = wrapper.data().annual_rewards_rate;
            let confirmed = ctx.settle(wrapper.set_annual_rewards(*rate).confirm().await).await?;
            wrapper.reload().await?;
            print_record(
                ctx.format,
                &[
                    Field::new("rewarder", rewarder),
                    Field::new("previous_rate", previous),
                    Field::new("annual_rewards_rate", wrapper.data().annual_rewards_rate),
                    Field::new("quarries", wrapper.data().num_quarries),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
    }
    Ok(())
}
