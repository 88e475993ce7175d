// crates/quarry-core/src/identity.rs
//
// Account addresses. Every record in the engine (mints, minters, rewarders,
// quarries, miners, token accounts) lives at a 32-byte `Pubkey`.
//
// Derived addresses are SHA-256 hashes over a seed list, so the same inputs
// always resolve to the same record:
//   minter:        ["MintWrapperMinter", mint, minter_authority]
//   rewarder:      ["Rewarder", base]
//   quarry:        ["Quarry", rewarder, token_mint]
//   miner:         ["Miner", quarry, authority]
//   token account: ["TokenAccount", owner, mint]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::hash_bytes;
use crate::error::QuarryError;

/// A 32-byte account address (an ed25519 public key or a derived address).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Random address, used for bases and fresh mints.
    pub fn new_unique() -> Self {
        Self(rand::random())
    }

    /// Derive a deterministic address from a list of seeds.
    pub fn derive(seeds: &[&[u8]]) -> Self {
        Self(hash_bytes(&seeds.concat()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// True for the all-zero address, used as "no key".
    pub fn is_default(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps test failure output readable.
        write!(f, "Pubkey({}..)", &hex::encode(self.0)[..8])
    }
}

impl FromStr for Pubkey {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            QuarryError::Serialization("Pubkey must be exactly 32 bytes (64 hex chars)".to_string())
        })?;
        Ok(Self(array))
    }
}

// Hex-string encoding so pubkeys can be used as JSON map keys in snapshots.
impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Address of the minter allowance record for `minter_authority` on `mint`.
pub fn minter_address(mint: &Pubkey, minter_authority: &Pubkey) -> Pubkey {
    Pubkey::derive(&[b"MintWrapperMinter", mint.as_ref(), minter_authority.as_ref()])
}

/// Address of a rewarder created from the random `base`.
pub fn rewarder_address(base: &Pubkey) -> Pubkey {
    Pubkey::derive(&[b"Rewarder", base.as_ref()])
}

/// Address of the quarry for `token_mint` under `rewarder`.
pub fn quarry_address(rewarder: &Pubkey, token_mint: &Pubkey) -> Pubkey {
    Pubkey::derive(&[b"Quarry", rewarder.as_ref(), token_mint.as_ref()])
}

/// Address of `authority`'s miner in `quarry`.
pub fn miner_address(quarry: &Pubkey, authority: &Pubkey) -> Pubkey {
    Pubkey::derive(&[b"Miner", quarry.as_ref(), authority.as_ref()])
}

/// Address of `owner`'s token account for `mint`.
pub fn token_account_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::derive(&[b"TokenAccount", owner.as_ref(), mint.as_ref()])
}
