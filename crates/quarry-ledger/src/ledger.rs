// crates/quarry-ledger/src/ledger.rs

use async_trait::async_trait;

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::{Confirmation, Receipt, Transaction};
use quarry_economics::program::ProgramState;

/// The ledger the reward program runs on.
///
/// Implemented by `InMemoryLedger`; the SDK only talks to this trait.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Verify signatures and fee-payer funds, then queue the transaction.
    ///
    /// Safe to retry: resubmitting an accepted transaction returns its
    /// original receipt and does not execute it again.
    async fn submit(&self, transaction: Transaction) -> Result<Receipt, QuarryError>;

    /// Process queued transactions up to `receipt` and report its outcome.
    ///
    /// Returns `NotFound` for a receipt the ledger never issued.
    async fn confirm(&self, receipt: &Receipt) -> Result<Confirmation, QuarryError>;

    /// Credit `lamports` to `to`. Returns the new balance.
    async fn airdrop(&self, to: &Pubkey, lamports: u64) -> Result<u64, QuarryError>;

    /// Committed program state.
    async fn snapshot(&self) -> Result<ProgramState, QuarryError>;

    /// Lamport balance of `who`.
    async fn balance_of(&self, who: &Pubkey) -> Result<u64, QuarryError>;

    /// Current ledger time in Unix seconds.
    async fn now(&self) -> Result<i64, QuarryError>;
}
