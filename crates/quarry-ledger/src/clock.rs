// crates/quarry-ledger/src/clock.rs
//
// Ledger clock. `System` follows wall time; `Manual` only moves when told to,
// which lets tests step through reward accrual deterministically.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Clock {
    System,
    Manual { now: i64 },
}

impl Clock {
    pub fn now(&self) -> i64 {
        match self {
            Clock::System => Utc::now().timestamp(),
            Clock::Manual { now } => *now,
        }
    }

    /// Switch to manual time, starting from the current reading.
    pub fn freeze(&mut self) {
        *self = Clock::Manual { now: self.now() };
    }

    /// Move a manual clock forward. A system clock is frozen first.
    pub fn advance(&mut self, seconds: i64) {
        let now = self.now().saturating_add(seconds);
        *self = Clock::Manual { now };
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
