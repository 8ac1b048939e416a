//! Defaults and tuning values shared by the verifier, the watcher and the
//! config loader

use std::time::Duration;

/// Snapshot verification constants
pub mod integrity {
    /// Bytes read per chunk while hashing a snapshot
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    /// Length of a SHA-256 digest in bytes
    pub const DIGEST_LEN: usize = 32;
}

/// Sync watcher constants
pub mod watcher {
    use super::Duration;

    /// Interval between status polls
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

    /// Floor for the poll interval, a zero interval would spin on the endpoint
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Maximum time to wait for the node to catch up
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(3600); // 1 hour
}

/// Node RPC constants
pub mod rpc {
    /// Per-request timeout for status and peer queries
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

    /// Value used for string fields the node did not report
    pub const UNKNOWN: &str = "unknown";
}

/// Default configuration values
pub mod defaults {
    /// Default config file location
    pub const CONFIG_PATH: &str = "config/main.toml";

    /// Default node RPC endpoint
    pub const RPC_URL: &str = "http://localhost:26657";
}
