// crates/quarry-sdk/src/sdk.rs
//
// QuarrySdk: the context every wrapper is built from.
//
// Holds the ledger, the wallet that signs and pays for transactions, and the
// client config. Cheap to clone; wrappers keep their own copy.

use std::sync::Arc;

use quarry_core::crypto::Keypair;
use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::Instruction;
use quarry_economics::program::ProgramState;
use quarry_ledger::Ledger;

use crate::config::SdkConfig;
use crate::envelope::TransactionEnvelope;
use crate::mine::MineClient;
use crate::mint_wrapper::MintWrapperClient;

#[derive(Clone)]
pub struct QuarrySdk {
    ledger: Arc<dyn Ledger>,
    wallet: Arc<Keypair>,
    config: SdkConfig,
}

impl QuarrySdk {
    pub fn new(ledger: Arc<dyn Ledger>, wallet: Keypair) -> Self {
        Self {
            ledger,
            wallet: Arc::new(wallet),
            config: SdkConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SdkConfig) -> Self {
        self.config = config;
        self
    }

    /// Same ledger and config, different wallet.
    pub fn with_wallet(&self, wallet: Keypair) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            wallet: Arc::new(wallet),
            config: self.config.clone(),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn wallet(&self) -> &Arc<Keypair> {
        &self.wallet
    }

    /// Public key of the wallet.
    pub fn wallet_key(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Client for mints and minter allowances.
    pub fn mint_wrapper(&self) -> MintWrapperClient {
        MintWrapperClient::new(self.clone())
    }

    /// Client for rewarders and quarries.
    pub fn mine(&self) -> MineClient {
        MineClient::new(self.clone())
    }

    /// Envelope with `instructions`, signed by the wallet.
    pub fn envelope(&self, instructions: Vec<Instruction>) -> TransactionEnvelope {
        TransactionEnvelope::new(self.clone(), instructions)
    }

    /// Committed program state.
    pub async fn state(&self) -> Result<ProgramState, QuarryError> {
        self.ledger.snapshot().await
    }

    /// Lamports held by the wallet.
    pub async fn wallet_balance(&self) -> Result<u64, QuarryError> {
        self.ledger.balance_of(&self.wallet_key()).await
    }
}

impl std::fmt::Debug for QuarrySdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuarrySdk")
            .field("wallet", &self.wallet_key())
            .field("config", &self.config)
            .finish()
    }
}
