// crates/quarry-cli/src/commands/mint.rs
//
// `quarry mint {create, grant}`: reward mints and minter allowances.

use clap::Subcommand;

use quarry_core::identity::Pubkey;
use quarry_economics::token::TokenAmount;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Subcommand)]
pub enum MintCmd {
    /// Create a mint with the wallet as its authority.
    Create {
        /// Decimals (0 to 18). Defaults to `reward_decimals` from the config.
        #[arg(long)]
        decimals: Option<u8>,
        /// Maximum supply in base units.
        #[arg(long)]
        hard_cap: Option<u64>,
    },
    /// Add to a minter's allowance on a mint.
    Grant {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        minter: Pubkey,
        /// Amount in base units.
        #[arg(long)]
        amount: u64,
    },
}

pub async fn run(ctx: &Context, cmd: &MintCmd) -> Result<(), Box<dyn std::error::Error>> {
    let sdk = ctx.sdk()?;
    let client = sdk.mint_wrapper();
    match cmd {
        MintCmd::Create { decimals, hard_cap } => {
            let decimals = decimals.unwrap_or(ctx.config.reward_decimals);
            let (tx, mint) = client.new_wrapper_and_mint(decimals, *hard_cap);
            let confirmed = ctx.settle(tx.confirm().await).await?;
            print_record(
                ctx.format,
                &[
                    Field::new("mint", mint),
                    Field::new("decimals", decimals),
                    Field::new(
                        "hard_cap",
                        hard_cap.map_or("none".to_string(), |cap| TokenAmount::new(cap, decimals).to_string()),
                    ),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
        MintCmd::Grant { mint, minter, amount } => {
            let confirmed = ctx.settle(client.grant(mint, minter, *amount).confirm().await).await?;
            let remaining = client
                .fetch_minter(mint, minter)
                .await?
                .map(|m| m.allowance)
                .unwrap_or(0);
            print_record(
                ctx.format,
                &[
                    Field::new("mint", mint),
                    Field::new("minter", minter),
                    Field::new("allowance", remaining),
                    Field::new("slot", confirmed.slot),
                ],
            );
        }
    }
    Ok(())
}
