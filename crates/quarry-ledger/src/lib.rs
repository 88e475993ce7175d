// crates/quarry-ledger/src/lib.rs
//
// quarry-ledger: the ledger the reward program runs on.
//
// Defines the async `Ledger` trait consumed by the SDK, an in-memory
// implementation that queues and processes signed transactions against the
// program state, and JSON snapshots for persisting it between runs.

pub mod clock;
pub mod ledger;
pub mod memory;
pub mod snapshot;

pub use clock::Clock;
pub use ledger::Ledger;
pub use memory::InMemoryLedger;
pub use snapshot::LedgerSnapshot;
