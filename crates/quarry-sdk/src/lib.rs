// crates/quarry-sdk/src/lib.rs
//
// quarry-sdk: client for the Quarry reward engine.
//
// A `QuarrySdk` bundles a ledger, a signing wallet, and client config. The
// mint wrapper, mine, rewarder, and quarry clients built from it produce
// `TransactionEnvelope`s that can be combined and sent as one transaction.

pub mod config;
pub mod envelope;
pub mod fixtures;
pub mod mine;
pub mod mint_wrapper;
pub mod quarry;
pub mod rewarder;
pub mod sdk;

pub use config::SdkConfig;
pub use envelope::{ConfirmedTransaction, PendingTransaction, TransactionEnvelope};
pub use fixtures::{create_rewarder, create_rewarder_and_quarry, RewarderAndQuarryFixture, RewarderFixture, RewarderParams};
pub use mine::MineClient;
pub use mint_wrapper::MintWrapperClient;
pub use quarry::QuarryWrapper;
pub use rewarder::RewarderWrapper;
pub use sdk::QuarrySdk;
