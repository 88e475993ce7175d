// crates/quarry-cli/src/config.rs
//
// Configuration for the `quarry` CLI.
// Loaded from a TOML file or populated with defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use quarry_sdk::{RewarderParams, SdkConfig};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Directory holding the ledger and the wallet key. `~` expands to home.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Ledger snapshot file, relative to `data_dir` unless absolute.
    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,

    /// Hex-encoded wallet secret key, relative to `data_dir` unless absolute.
    #[serde(default = "default_keypair_file")]
    pub keypair_file: String,

    /// Log level: "trace", "debug", "info", "warn", "error". `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,

    /// Decimals of reward mints created by `mint create` and `fixture`.
    #[serde(default = "default_reward_decimals")]
    pub reward_decimals: u8,

    /// Hard cap of the fixture's reward mint.
    #[serde(default = "default_reward_hard_cap")]
    pub reward_hard_cap: u64,

    /// Allowance the fixture grants its rewarder.
    #[serde(default = "default_minter_allowance")]
    pub minter_allowance: u64,

    /// Lamports credited by `airdrop` and the fixture.
    #[serde(default = "default_airdrop_lamports")]
    pub airdrop_lamports: u64,
}

fn default_data_dir() -> String {
    "~/.quarry".to_string()
}

fn default_ledger_file() -> String {
    "ledger.json".to_string()
}

fn default_keypair_file() -> String {
    "id.secret".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_confirm_timeout_ms() -> u64 {
    30_000
}

fn default_reward_decimals() -> u8 {
    6
}

fn default_reward_hard_cap() -> u64 {
    1_000_000_000_000_000
}

fn default_minter_allowance() -> u64 {
    1_000_000_000
}

fn default_airdrop_lamports() -> u64 {
    10_000_000_000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ledger_file: default_ledger_file(),
            keypair_file: default_keypair_file(),
            log_level: default_log_level(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
            reward_decimals: default_reward_decimals(),
            reward_hard_cap: default_reward_hard_cap(),
            minter_allowance: default_minter_allowance(),
            airdrop_lamports: default_airdrop_lamports(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `~/.quarry/config.toml`.
    pub fn default_path() -> PathBuf {
        expand_home(&format!("{}/config.toml", default_data_dir()))
    }

    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir().join(expand_home(&self.ledger_file))
    }

    pub fn keypair_path(&self) -> PathBuf {
        self.data_dir().join(expand_home(&self.keypair_file))
    }

    pub fn sdk_config(&self) -> SdkConfig {
        SdkConfig {
            confirm_timeout: Duration::from_millis(self.confirm_timeout_ms),
            ..SdkConfig::default()
        }
    }

    pub fn rewarder_params(&self) -> RewarderParams {
        RewarderParams {
            airdrop_lamports: self.airdrop_lamports,
            reward_decimals: self.reward_decimals,
            reward_hard_cap: self.reward_hard_cap,
            minter_allowance: self.minter_allowance,
            sdk_config: self.sdk_config(),
        }
    }
}

/// Replace a leading `~` with the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.reward_decimals, 6);
        assert_eq!(config.minter_allowance, 1_000_000_000);
    }

    #[test]
    fn test_partial_file_overrides() {
        let config: CliConfig = toml::from_str(
            r#"
            data_dir = "/tmp/quarry-test"
            confirm_timeout_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/quarry-test/ledger.json"));
        assert_eq!(config.sdk_config().confirm_timeout, Duration::from_millis(500));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_absolute_ledger_file_wins() {
        let config = CliConfig {
            data_dir: "/tmp/a".to_string(),
            ledger_file: "/var/b.json".to_string(),
            ..CliConfig::default()
        };
        assert_eq!(config.ledger_path(), PathBuf::from("/var/b.json"));
    }

    #[test]
    fn test_rewarder_params_follow_config() {
        let config = CliConfig {
            reward_hard_cap: 7,
            ..CliConfig::default()
        };
        let params = config.rewarder_params();
        assert_eq!(params.reward_hard_cap, 7);
        assert_eq!(params.airdrop_lamports, 10_000_000_000);
    }
}
