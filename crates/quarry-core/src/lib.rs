// crates/quarry-core/src/lib.rs
//
// quarry-core: Core types, errors, signing, and transaction primitives for the
// Quarry reward engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines account addresses, the protocol-wide error type, ed25519 signing
// helpers, and the instruction/transaction wire types exchanged with a ledger.

pub mod crypto;
pub mod error;
pub mod events;
pub mod identity;
pub mod transaction;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use quarry_core::Pubkey;`

pub use crypto::Keypair;
pub use error::QuarryError;
pub use events::ProgramEvent;
pub use identity::{
    miner_address, minter_address, quarry_address, rewarder_address, token_account_address,
    Pubkey,
};
pub use transaction::{
    Confirmation, Instruction, Message, Receipt, SignatureEntry, Transaction, LAMPORTS_PER_SIGNATURE,
    LAMPORTS_PER_SOL,
};
