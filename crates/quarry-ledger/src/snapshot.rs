// crates/quarry-ledger/src/snapshot.rs
//
// On-disk form of an in-memory ledger: pretty-printed JSON holding the
// program state, lamport balances, slot, and clock mode.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use quarry_core::error::QuarryError;
use quarry_core::identity::Pubkey;
use quarry_economics::program::ProgramState;

use crate::clock::Clock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub state: ProgramState,
    pub lamports: BTreeMap<Pubkey, u64>,
    pub slot: u64,
    pub clock: Clock,
}

impl LedgerSnapshot {
    pub async fn load(path: &Path) -> Result<Self, QuarryError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write to `path`, creating parent directories as needed.
    pub async fn save(&self, path: &Path) -> Result<(), QuarryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("quarry-snap-{}", Uuid::now_v7()));
        let path = dir.join("nested").join("ledger.json");
        let mut snapshot = LedgerSnapshot::default();
        snapshot.lamports.insert(Pubkey::new([5u8; 32]), 77);
        snapshot.clock = Clock::Manual { now: 9 };
        snapshot.save(&path).await.unwrap();

        let loaded = LedgerSnapshot::load(&path).await.unwrap();
        assert_eq!(loaded, snapshot);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_load_garbage_is_serialization_error() {
        let path = std::env::temp_dir().join(format!("quarry-bad-{}.json", Uuid::now_v7()));
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            LedgerSnapshot::load(&path).await,
            Err(QuarryError::Serialization(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_load_missing_is_io_error() {
        let path = std::env::temp_dir().join(format!("quarry-none-{}.json", Uuid::now_v7()));
        assert!(matches!(LedgerSnapshot::load(&path).await, Err(QuarryError::Io(_))));
    }
}
