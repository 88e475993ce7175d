// crates/quarry-cli/src/commands/wallet.rs
//
// `quarry wallet {create, show}`: the authority keypair.

use std::fs;

use clap::Subcommand;

use quarry_core::crypto::Keypair;

use crate::context::Context;
use crate::output::{print_record, Field};

#[derive(Debug, Subcommand)]
pub enum WalletCmd {
    /// Generate a new ed25519 keypair and save it as the wallet.
    Create {
        /// Replace an existing wallet.
        #[arg(long)]
        force: bool,
    },
    /// Print the wallet's public key and lamport balance.
    Show,
}

pub async fn run(ctx: &Context, cmd: &WalletCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WalletCmd::Create { force } => create_wallet(ctx, *force),
        WalletCmd::Show => show_wallet(ctx).await,
    }
}

fn create_wallet(ctx: &Context, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let secret_path = ctx.config.keypair_path();
    if secret_path.exists() && !force {
        return Err(format!(
            "Wallet already exists at {}. Pass --force to replace it.",
            secret_path.display()
        )
        .into());
    }
    if let Some(parent) = secret_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let keypair = Keypair::generate();
    let pub_path = secret_path.with_extension("pub");
    fs::write(&secret_path, keypair.secret_hex())?;
    fs::write(&pub_path, keypair.pubkey().to_string())?;
    tracing::info!("Wrote wallet to {}", secret_path.display());

    print_record(
        ctx.format,
        &[
            Field::new("pubkey", keypair.pubkey()),
            Field::new("secret_key_file", secret_path.display()),
        ],
    );
    Ok(())
}

async fn show_wallet(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let sdk = ctx.sdk()?;
    let lamports = sdk.wallet_balance().await?;
    print_record(
        ctx.format,
        &[
            Field::new("pubkey", sdk.wallet_key()),
            Field::new("lamports", lamports),
        ],
    );
    Ok(())
}
