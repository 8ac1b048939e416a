pub mod config;
pub mod constants;
pub mod errors;
pub mod integrity;
pub mod report;
pub mod rpc;
pub mod watcher;

// Re-export commonly used types
pub use config::{Config, ConfigManager, ReportFormat};
pub use errors::{BootstrapError, ConfigError, VerifyError, WatchError};
pub use integrity::{Digest, IntegrityVerifier, VerificationResult};
pub use report::Reporter;
pub use rpc::{NodeRpcClient, NodeSyncSnapshot, PeerInfo};
pub use watcher::{SyncOutcome, SyncWatcher, WatchSummary};
