// crates/quarry-cli/src/main.rs
//
// CLI entrypoint for the Quarry reward engine.
//
// Every invocation loads the ledger snapshot from the data directory, runs
// one command against it, and writes it back if the command changed state.

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::airdrop::AirdropCmd;
use commands::fixture::FixtureCmd;
use commands::mint::MintCmd;
use commands::quarry::QuarryCmd;
use commands::rewarder::RewarderCmd;
use commands::status::StatusCmd;
use commands::wallet::WalletCmd;
use config::CliConfig;
use context::Context;
use output::OutputFormat;

/// Quarry CLI: reward mints, rewarders, and share-weighted quarries.
#[derive(Parser, Debug)]
#[command(name = "quarry", version = "0.1.0", about = "Quarry reward engine CLI")]
struct Cli {
    /// Path to the TOML configuration file. Defaults to ~/.quarry/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Wallet management: create, show.
    #[command(subcommand)]
    Wallet(WalletCmd),

    /// Credit lamports for transaction fees.
    Airdrop(AirdropCmd),

    /// Mints and minter allowances.
    #[command(subcommand)]
    Mint(MintCmd),

    /// Rewarders: create, set-rate.
    #[command(subcommand)]
    Rewarder(RewarderCmd),

    /// Quarries: create, set-share.
    #[command(subcommand)]
    Quarry(QuarryCmd),

    /// Create a funded rewarder with one quarry.
    Fixture(FixtureCmd),

    /// Show rewarders, quarries, and rates.
    Status(StatusCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let loaded = CliConfig::load(&config_path);
    let config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => CliConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::debug!("Loaded configuration from {}", config_path.display()),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    let ctx = Context::open(config, OutputFormat::from_json_flag(cli.json)).await?;

    match &cli.command {
        Commands::Wallet(cmd) => commands::wallet::run(&ctx, cmd).await?,
        Commands::Airdrop(cmd) => commands::airdrop::run(&ctx, cmd).await?,
        Commands::Mint(cmd) => commands::mint::run(&ctx, cmd).await?,
        Commands::Rewarder(cmd) => commands::rewarder::run(&ctx, cmd).await?,
        Commands::Quarry(cmd) => commands::quarry::run(&ctx, cmd).await?,
        Commands::Fixture(cmd) => commands::fixture::run(&ctx, cmd).await?,
        Commands::Status(cmd) => commands::status::run(&ctx, cmd).await?,
    }

    Ok(())
}
