// crates/quarry-ledger/src/memory.rs
//
// InMemoryLedger: a single-node ledger holding the program state in memory.
//
// Submitted transactions are queued. `confirm` drains the queue in submission
// order under the write lock until the requested receipt has been processed,
// so every transaction sees the committed result of all earlier ones. Each
// processed transaction is charged its fee whether or not its instructions
// succeed; a failed transaction changes nothing else.
//
// A transaction is identified by its fee payer and message nonce. Submitting
// one again returns the receipt it was first given, so a retried submit never
// executes twice. Only the most recent `MAX_RECENT_TRANSACTIONS` outcomes are
// remembered.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_core::transaction::{Confirmation, Receipt, Transaction};
use quarry_economics::program::ProgramState;

use crate::clock::Clock;
use crate::ledger::Ledger;
use crate::snapshot::LedgerSnapshot;

/// Processed outcomes (and their dedup keys) kept for `confirm` and replays.
pub const MAX_RECENT_TRANSACTIONS: usize = 4096;

type TxKey = (Pubkey, Uuid);

fn tx_key(transaction: &Transaction) -> TxKey {
    (transaction.message.fee_payer, transaction.message.nonce)
}

/// A verified transaction waiting to be processed.
struct Pending {
    receipt: Receipt,
    transaction: Transaction,
    signers: Vec<Pubkey>,
}

#[derive(Default)]
struct LedgerInner {
    state: ProgramState,
    lamports: BTreeMap<Pubkey, u64>,
    slot: u64,
    clock: Clock,
    queue: VecDeque<Pending>,
    processed: HashMap<Uuid, Confirmation>,
    seen: HashMap<TxKey, Receipt>,
    /// Processing order, oldest first, for eviction.
    history: VecDeque<(Uuid, TxKey)>,
}

impl LedgerInner {
    fn balance(&self, who: &Pubkey) -> u64 {
        self.lamports.get(who).copied().unwrap_or(0)
    }

    fn process_next(&mut self) -> Option<Uuid> {
        let pending = self.queue.pop_front()?;
        let id = pending.receipt.id;
        let key = tx_key(&pending.transaction);
        let confirmation = self.process(pending);
        self.processed.insert(id, confirmation);
        self.history.push_back((id, key));
        while self.history.len() > MAX_RECENT_TRANSACTIONS {
            if let Some((old_id, old_key)) = self.history.pop_front() {
                self.processed.remove(&old_id);
                self.seen.remove(&old_key);
            }
        }
        Some(id)
    }

    fn process(&mut self, pending: Pending) -> Confirmation {
        let tx = &pending.transaction;
        let payer = tx.message.fee_payer;
        let fee = tx.fee();
        let available = self.balance(&payer);
        if available < fee {
            tracing::warn!("Dropping transaction {}: fee payer {} cannot pay", pending.receipt.id, payer);
            return Confirmation::Failure {
                error: QuarryError::InsufficientFunds { needed: fee, available },
            };
        }
        self.lamports.insert(payer, available - fee);

        let now = self.clock.now();
        match self.state.execute(&pending.signers, &tx.message.instructions, now) {
            Ok(events) => {
                self.slot += 1;
                tracing::info!(
                    "Processed transaction {} at slot {} ({} instructions, {} events)",
                    pending.receipt.id,
                    self.slot,
                    tx.message.instructions.len(),
                    events.len()
                );
                for event in &events {
                    tracing::debug!(?event, "program event");
                }
                Confirmation::Success {
                    slot: self.slot,
                    events,
                }
            }
            Err(error) => {
                tracing::warn!("Transaction {} failed: {}", pending.receipt.id, error);
                Confirmation::Failure { error }
            }
        }
    }

    fn drain(&mut self) {
        while self.process_next().is_some() {}
    }

    fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            state: self.state.clone(),
            lamports: self.lamports.clone(),
            slot: self.slot,
            clock: self.clock,
        }
    }
}

/// In-memory `Ledger` with optional JSON persistence.
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    /// Empty ledger on the system clock.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerInner::default()),
        }
    }

    /// Empty ledger on a manual clock starting at `now`.
    pub fn with_manual_clock(now: i64) -> Self {
        let inner = LedgerInner {
            clock: Clock::Manual { now },
            ..LedgerInner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let inner = LedgerInner {
            state: snapshot.state,
            lamports: snapshot.lamports,
            slot: snapshot.slot,
            clock: snapshot.clock,
            ..LedgerInner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Load a ledger from `path`, or start empty if the file does not exist.
    pub async fn open(path: &Path) -> Result<Self, QuarryError> {
        if !tokio::fs::try_exists(path).await? {
            tracing::info!("No ledger at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let snapshot = LedgerSnapshot::load(path).await?;
        tracing::info!("Loaded ledger from {} at slot {}", path.display(), snapshot.slot);
        Ok(Self::from_snapshot(snapshot))
    }

    /// Process every queued transaction, then write the ledger to `path`.
    pub async fn save(&self, path: &Path) -> Result<(), QuarryError> {
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.drain();
            inner.to_snapshot()
        };
        snapshot.save(path).await?;
        tracing::info!("Saved ledger to {} at slot {}", path.display(), snapshot.slot);
        Ok(())
    }

    /// Set a manual time.
    pub async fn set_time(&self, now: i64) {
        self.inner.write().await.clock = Clock::Manual { now };
    }

    /// Move the clock forward by `seconds`, switching to manual time.
    pub async fn advance(&self, seconds: i64) {
        self.inner.write().await.clock.advance(seconds);
    }

    /// Number of processed transactions.
    pub async fn slot(&self) -> u64 {
        self.inner.read().await.slot
    }

    /// Number of transactions waiting for confirmation.
    pub async fn queued(&self) -> usize {
        self.inner.read().await.queue.len()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn submit(&self, transaction: Transaction) -> Result<Receipt, QuarryError> {
        let signers = transaction.verify()?;
        let key = tx_key(&transaction);
        let mut inner = self.inner.write().await;
        if let Some(receipt) = inner.seen.get(&key) {
            tracing::debug!("Transaction {} already submitted, returning its receipt", receipt.id);
            return Ok(receipt.clone());
        }
        let fee = transaction.fee();
        let available = inner.balance(&transaction.message.fee_payer);
        if available < fee {
            return Err(QuarryError::InsufficientFunds { needed: fee, available });
        }
        let receipt = Receipt::new();
        tracing::debug!(
            "Queued transaction {} from {}",
            receipt.id,
            transaction.message.fee_payer
        );
        inner.seen.insert(key, receipt.clone());
        inner.queue.push_back(Pending {
            receipt: receipt.clone(),
            transaction,
            signers,
        });
        Ok(receipt)
    }

    async fn confirm(&self, receipt: &Receipt) -> Result<Confirmation, QuarryError> {
        if let Some(confirmation) = self.inner.read().await.processed.get(&receipt.id) {
            return Ok(confirmation.clone());
        }
        let mut inner = self.inner.write().await;
        if !inner.processed.contains_key(&receipt.id) {
            if !inner.queue.iter().any(|p| p.receipt.id == receipt.id) {
                return Err(QuarryError::NotFound(format!("Receipt {}", receipt.id)));
            }
            while let Some(id) = inner.process_next() {
                if id == receipt.id {
                    break;
                }
            }
        }
        inner
            .processed
            .get(&receipt.id)
            .cloned()
            .ok_or_else(|| QuarryError::Ledger(format!("Transaction {} was dropped", receipt.id)))
    }

    async fn airdrop(&self, to: &Pubkey, lamports: u64) -> Result<u64, QuarryError> {
        let mut inner = self.inner.write().await;
        let balance = inner
            .balance(to)
            .checked_add(lamports)
            .ok_or_else(|| QuarryError::InvalidAmount("Lamport balance overflow".to_string()))?;
        inner.lamports.insert(*to, balance);
        tracing::info!("Airdropped {} lamports to {}", lamports, to);
        Ok(balance)
    }

    async fn snapshot(&self) -> Result<ProgramState, QuarryError> {
        Ok(self.inner.read().await.state.clone())
    }

    async fn balance_of(&self, who: &Pubkey) -> Result<u64, QuarryError> {
        Ok(self.inner.read().await.balance(who))
    }

    async fn now(&self) -> Result<i64, QuarryError> {
        Ok(self.inner.read().await.clock.now())
    }
}
