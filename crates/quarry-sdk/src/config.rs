// crates/quarry-sdk/src/config.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client-side settings shared by every wrapper built from a `QuarrySdk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// How long `confirm` waits for a transaction to be finalized.
    pub confirm_timeout: Duration,
    /// How many times `send` resubmits after a transient ledger failure.
    pub send_retries: u32,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(30),
            send_retries: 2,
        }
    }
}
