// crates/quarry-cli/src/commands/airdrop.rs
//
// `quarry airdrop`: fund the wallet with lamports for fees.

use clap::Args;

use quarry_core::identity::Pubkey;
use quarry_ledger::Ledger;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Args)]
pub struct AirdropCmd {
    /// Lamports to credit. Defaults to `airdrop_lamports` from the config.
    #[arg(long)]
    pub lamports: Option<u64>,

    /// Recipient. Defaults to the wallet.
    #[arg(long)]
    pub to: Option<Pubkey>,
}

pub async fn run(ctx: &Context, cmd: &AirdropCmd) -> Result<(), Box<dyn std::error::Error>> {
    let to = match cmd.to {
        Some(to) => to,
        None => ctx.wallet()?.pubkey(),
    };
    let lamports = cmd.lamports.unwrap_or(ctx.config.airdrop_lamports);
    let balance = ctx.ledger.airdrop(&to, lamports).await?;
    ctx.save().await?;

    print_record(
        ctx.format,
        &[Field::new("recipient", to), Field::new("balance", balance)],
    );
    Ok(())
}
