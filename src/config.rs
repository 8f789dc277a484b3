//! Worker options loading
//!
//! Options are read from a TOML file. Only `block_threshold` and
//! `ethereum_network_id` are required.
//!
//! # Example file:
//! ```toml
//! block_threshold = 2
//! ethereum_network_id = 1
//! block_polling_refresh_rate = 1000
//! rpc_url = "http://127.0.0.1:8545"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options shared by the tracker and the global config refresher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerOptions {
    /// Confirmations required before a mined transaction is final
    pub block_threshold: u64,
    /// Block polling interval in milliseconds
    #[serde(default = "default_refresh_rate")]
    pub block_polling_refresh_rate: u64,
    /// Transaction initialization interval in milliseconds
    #[serde(default = "default_refresh_rate")]
    pub transaction_initialization_refresh_rate: u64,
    /// Chain height refresh interval in milliseconds
    #[serde(default = "default_block_number_refresh_rate")]
    pub block_number_refresh_rate: u64,
    /// Network id the node must report
    pub ethereum_network_id: u64,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_refresh_rate() -> u64 {
    1000
}

fn default_block_number_refresh_rate() -> u64 {
    5000
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./txwatch_db")
}

impl WorkerOptions {
    /// Options with default intervals and endpoints.
    pub fn new(block_threshold: u64, ethereum_network_id: u64) -> Self {
        Self {
            block_threshold,
            block_polling_refresh_rate: default_refresh_rate(),
            transaction_initialization_refresh_rate: default_refresh_rate(),
            block_number_refresh_rate: default_block_number_refresh_rate(),
            ethereum_network_id,
            rpc_url: default_rpc_url(),
            db_path: default_db_path(),
        }
    }

    pub fn block_polling_interval(&self) -> Duration {
        Duration::from_millis(self.block_polling_refresh_rate)
    }

    pub fn transaction_initialization_interval(&self) -> Duration {
        Duration::from_millis(self.transaction_initialization_refresh_rate)
    }

    pub fn block_number_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.block_number_refresh_rate)
    }

    fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("block_polling_refresh_rate", self.block_polling_refresh_rate),
            (
                "transaction_initialization_refresh_rate",
                self.transaction_initialization_refresh_rate,
            ),
            ("block_number_refresh_rate", self.block_number_refresh_rate),
        ] {
            if rate == 0 {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }
        Ok(())
    }
}

/// Parse and validate options from TOML text.
pub fn parse_options(contents: &str) -> Result<WorkerOptions> {
    let options: WorkerOptions =
        toml::from_str(contents).context("Failed to parse worker options")?;
    options.validate()?;
    Ok(options)
}

/// Load worker options from a file.
pub fn load_options(path: &Path) -> Result<WorkerOptions> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file: {:?}", path))?;
    parse_options(&contents).with_context(|| format!("Invalid options file: {:?}", path))
}
