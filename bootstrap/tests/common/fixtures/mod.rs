//! This module provides reusable test utilities:
//! - Mock CometBFT RPC server
//! - Snapshot files on disk

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_rpc;
pub mod snapshot_files;

// Re-export commonly used items
pub use mock_rpc::{unused_local_url, MockRpcServer};
pub use snapshot_files::*;
