// crates/quarry-core/src/error.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for the Quarry reward engine and its ledger collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarryError {
    /// Numeric input out of range (overflow, rate above the maximum, ...).
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The acting identity is not the required authority or did not sign.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A mint request exceeds the minter's remaining allowance.
    #[error("Minter allowance exceeded: requested {requested}, remaining {remaining}")]
    AllowanceExceeded { requested: u64, remaining: u64 },

    /// Missing allowance, mint, rewarder, quarry, or miner.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A quarry already exists for this (rewarder, staked token) pair.
    #[error("Quarry already exists for rewarder {rewarder} and token {token_mint}")]
    DuplicateQuarry { rewarder: String, token_mint: String },

    /// Decimals outside of 0..=18.
    #[error("Invalid decimals: {0} (must be between 0 and 18)")]
    InvalidDecimals(u8),

    /// Minting would push supply above the mint's hard cap.
    #[error("Cannot mint over hard cap: new supply {new_supply}, hard cap {hard_cap}")]
    HardcapExceeded { new_supply: u64, hard_cap: u64 },

    /// Token balance too small for a transfer or withdrawal.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// A timestamp earlier than the last checkpoint.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A record already exists at the given address.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A transaction signature failed to verify.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The fee payer cannot cover the transaction fee.
    #[error("Insufficient funds for fee: need {needed} lamports, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// Ledger collaborator failure (unknown receipt, dropped transaction, ...).
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Waiting for confirmation timed out. The transaction may still land.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for QuarryError {
    fn from(e: serde_json::Error) -> Self {
        QuarryError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for QuarryError {
    fn from(e: std::io::Error) -> Self {
        QuarryError::Io(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for QuarryError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        QuarryError::InvalidSignature(e.to_string())
    }
}

impl From<hex::FromHexError> for QuarryError {
    fn from(e: hex::FromHexError) -> Self {
        QuarryError::Serialization(e.to_string())
    }
}
