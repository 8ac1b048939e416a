pub mod manager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
pub use manager::ConfigManager;

use crate::constants::{defaults, integrity, rpc, watcher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    pub snapshot_path: PathBuf,
    #[serde(default)]
    pub expected_digest: String,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,
    #[serde(default = "default_rpc_timeout_seconds")]
    pub rpc_timeout_seconds: u64,
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: usize,
    #[serde(default)]
    pub report_format: ReportFormat,
    // Skips the digest check, e.g. when the snapshot was already verified
    #[serde(default)]
    pub skip_verification: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_seconds)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }
}

fn default_rpc_url() -> String {
    defaults::RPC_URL.to_string()
}

fn default_poll_interval_seconds() -> u64 {
    watcher::DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_max_wait_seconds() -> u64 {
    watcher::DEFAULT_MAX_WAIT.as_secs()
}

fn default_rpc_timeout_seconds() -> u64 {
    rpc::DEFAULT_TIMEOUT_SECONDS
}

fn default_chunk_size_bytes() -> usize {
    integrity::DEFAULT_CHUNK_SIZE
}
