// crates/quarry-cli/src/commands/quarry.rs
//
// `quarry quarry {create, set-share}`.

use clap::Subcommand;

use quarry_core::identity::Pubkey;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Subcommand)]
pub enum QuarryCmd {
    /// Create the quarry for a stake token under a rewarder.
    Create {
        #[arg(long)]
        rewarder: Pubkey,
        /// Mint of the token staked in the quarry.
        #[arg(long)]
        token: Pubkey,
    },
    /// Set a quarry's rewards share. Every quarry of the rewarder is resynced.
    SetShare {
        #[arg(long)]
        rewarder: Pubkey,
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        share: u64,
    },
}

pub async fn run(ctx: &Context, cmd: &QuarryCmd) -> Result<(), Box<dyn std::error::Error>> {
    let sdk = ctx.sdk()?;
    match cmd {
        QuarryCmd::Create { rewarder, token } => {
            let wrapper = sdk.mine().load_rewarder_wrapper(rewarder).await?;
            let (tx, quarry) = wrapper.create_quarry(token);
            let confirmed = ctx.settle(tx.confirm().await).await?;
            print_record(
                ctx.format,
                &[
                    Field::new("quarry", quarry),
                    Field::new("rewarder", rewarder),
                    Field::new("token", token),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
        QuarryCmd::SetShare { rewarder, token, share } => {
            let wrapper = sdk.mine().load_rewarder_wrapper(rewarder).await?;
            let mut quarry = wrapper.get_quarry(token).await?;
            let confirmed = ctx.settle(quarry.set_rewards_share(*share).confirm().await).await?;
            quarry.reload().await?;
            print_record(
                ctx.format,
                &[
                    Field::new("quarry", quarry.key()),
                    Field::new("rewards_share", quarry.data().rewards_share),
                    Field::new("annual_rewards_rate", quarry.data().annual_rewards_rate),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
    }
    Ok(())
}
