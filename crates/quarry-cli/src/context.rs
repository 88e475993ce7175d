// crates/quarry-cli/src/context.rs
//
// Per-invocation context: config, the file-backed ledger, and output format.
// Commands that change state call `save` before returning. Transactions go
// through `settle`, which saves even when they fail: the fee was charged.

use std::fs;
use std::sync::Arc;

use quarry_core::crypto::Keypair;
use quarry_ledger::{InMemoryLedger, Ledger};
use quarry_sdk::QuarrySdk;

use crate::config::CliConfig;
use crate::output::OutputFormat;

pub struct Context {
    pub config: CliConfig,
    pub ledger: Arc<InMemoryLedger>,
    pub format: OutputFormat,
}

impl Context {
    pub async fn open(config: CliConfig, format: OutputFormat) -> Result<Self, Box<dyn std::error::Error>> {
        let ledger = InMemoryLedger::open(&config.ledger_path()).await?;
        Ok(Self {
            config,
            ledger: Arc::new(ledger),
            format,
        })
    }

    pub fn dyn_ledger(&self) -> Arc<dyn Ledger> {
        self.ledger.clone()
    }

    /// Read the wallet written by `quarry wallet create`.
    pub fn wallet(&self) -> Result<Keypair, Box<dyn std::error::Error>> {
        let path = self.config.keypair_path();
        let secret = fs::read_to_string(&path)
            .map_err(|e| format!("No wallet at {} ({}). Run `quarry wallet create` first.", path.display(), e))?;
        Ok(Keypair::from_secret_hex(&secret)?)
    }

    /// SDK signing with the wallet.
    pub fn sdk(&self) -> Result<QuarrySdk, Box<dyn std::error::Error>> {
        Ok(QuarrySdk::new(self.dyn_ledger(), self.wallet()?).with_config(self.config.sdk_config()))
    }

    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.ledger.save(&self.config.ledger_path()).await?;
        Ok(())
    }

    /// Save the ledger, then hand back the outcome of a transaction.
    pub async fn settle<T, E>(&self, outcome: Result<T, E>) -> Result<T, Box<dyn std::error::Error>>
    where
        E: Into<Box<dyn std::error::Error>>,
    {
        self.save().await?;
        outcome.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::identity::Pubkey;
    use quarry_core::transaction::{LAMPORTS_PER_SIGNATURE, LAMPORTS_PER_SOL};

    fn temp_config() -> CliConfig {
        let dir = std::env::temp_dir().join(format!("quarry-cli-{}", Pubkey::new_unique()));
        CliConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            ..CliConfig::default()
        }
    }

    #[tokio::test]
    async fn test_failed_transaction_fee_is_saved() {
        let config = temp_config();
        fs::create_dir_all(config.data_dir()).unwrap();
        let wallet = Keypair::generate();
        fs::write(config.keypair_path(), wallet.secret_hex()).unwrap();

        let ctx = Context::open(config.clone(), OutputFormat::Table).await.unwrap();
        ctx.ledger.airdrop(&wallet.pubkey(), LAMPORTS_PER_SOL).await.unwrap();
        let sdk = ctx.sdk().unwrap();
        // No such mint: the transaction fails after paying its fee.
        let (tx, _) = sdk.mine().create_rewarder(&Pubkey::new_unique());
        let result = ctx.settle(tx.confirm().await).await;
        assert!(result.is_err());

        let reopened = InMemoryLedger::open(&config.ledger_path()).await.unwrap();
        assert_eq!(
            reopened.balance_of(&wallet.pubkey()).await.unwrap(),
            LAMPORTS_PER_SOL - LAMPORTS_PER_SIGNATURE
        );
        let _ = fs::remove_dir_all(config.data_dir());
    }
}
