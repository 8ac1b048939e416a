//! Snapshot files written to temporary directories

use sha2::{Digest as _, Sha256};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use bootstrap::Digest;

/// A snapshot file that lives as long as its directory
pub struct SnapshotFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write `contents` to a fresh temp dir as a fake snapshot archive
pub fn write_snapshot(contents: &[u8]) -> SnapshotFile {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("celestia_chain_4057159.tar.zst");
    fs::write(&path, contents).expect("Failed to write snapshot");
    SnapshotFile { dir, path }
}

/// Deterministic pseudo-random bytes
pub fn snapshot_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 251) as u8).collect()
}

/// Reference digest computed in one shot
pub fn reference_digest(contents: &[u8]) -> Digest {
    Digest::from_bytes(Sha256::digest(contents).into())
}
