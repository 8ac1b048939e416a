//! Streaming snapshot integrity verification
//!
//! Snapshot archives can be many gigabytes, so the file is never loaded at
//! once: it is read in fixed-size chunks that are fed into an incremental
//! SHA-256 hasher. Memory use is one chunk plus the hasher state.
//!
//! # Verification Steps
//!
//! 1. Resolve the path to a readable regular file (`NotFound` otherwise, no
//!    bytes are hashed)
//! 2. Hash the whole file chunk by chunk (`Io` on a mid-stream read failure)
//! 3. Compare the finalized digest with the expected one byte for byte

mod digest;

pub use digest::{Digest, DigestParseError};

use serde::Serialize;
use sha2::{Digest as _, Sha256};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::integrity::DEFAULT_CHUNK_SIZE;
use crate::errors::{BootstrapError, VerifyError};

/// Result of verifying one file against a reference digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub path: PathBuf,
    /// Absent when verification stopped on an error
    pub observed_digest: Option<Digest>,
    pub expected_digest: Digest,
    pub matched: bool,
    pub bytes_read: u64,
    pub error: Option<VerifyError>,
}

impl VerificationResult {
    fn completed(path: &Path, observed: Digest, expected: Digest, bytes_read: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            observed_digest: Some(observed),
            expected_digest: expected,
            matched: observed == expected,
            bytes_read,
            error: None,
        }
    }

    /// `Ok` only when the file was read in full and the digests match
    pub fn ensure_matched(&self) -> Result<(), BootstrapError> {
        if let Some(error) = &self.error {
            return Err(error.clone().into());
        }
        if self.matched {
            return Ok(());
        }
        Err(BootstrapError::IntegrityMismatch {
            path: self.path.display().to_string(),
            expected: self.expected_digest.to_hex(),
            observed: self
                .observed_digest
                .map(|d| d.to_hex())
                .unwrap_or_else(|| "unavailable".to_string()),
        })
    }

    fn failed(path: &Path, expected: Digest, error: VerifyError) -> Self {
        Self {
            path: path.to_path_buf(),
            observed_digest: None,
            expected_digest: expected,
            matched: false,
            bytes_read: 0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    chunk_size: usize,
}

impl Default for IntegrityVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrityVerifier {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Chunk size only affects throughput, never the digest
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Verify the file at `path` against `expected`
    pub fn verify(&self, path: impl AsRef<Path>, expected: &Digest) -> VerificationResult {
        let path = path.as_ref();
        info!("Verifying snapshot integrity for {}", path.display());

        let file = match open_regular_file(path) {
            Ok(file) => file,
            Err(e) => {
                let err = VerifyError::NotFound {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                };
                error!("{}", err);
                return VerificationResult::failed(path, *expected, err);
            }
        };

        self.verify_reader(path, file, expected)
    }

    /// Hash an already opened stream; `path` only labels the result
    pub fn verify_reader<R: Read>(
        &self,
        path: &Path,
        reader: R,
        expected: &Digest,
    ) -> VerificationResult {
        let (observed, bytes_read) = match digest_reader(reader, self.chunk_size) {
            Ok(done) => done,
            Err(e) => {
                let err = VerifyError::Io {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                };
                error!("{}", err);
                return VerificationResult::failed(path, *expected, err);
            }
        };

        let result = VerificationResult::completed(path, observed, *expected, bytes_read);
        if result.matched {
            info!(
                "✓ Snapshot integrity verified: {} ({} bytes)",
                observed, bytes_read
            );
        } else {
            warn!(
                "Snapshot integrity failed. Expected: {}, Got: {}",
                expected, observed
            );
        }
        result
    }

    /// Run [`IntegrityVerifier::verify`] on tokio's blocking pool
    pub async fn verify_blocking(
        &self,
        path: impl Into<PathBuf>,
        expected: Digest,
    ) -> VerificationResult {
        let path = path.into();
        let verifier = self.clone();
        let task_path = path.clone();

        match tokio::task::spawn_blocking(move || verifier.verify(&task_path, &expected)).await {
            Ok(result) => result,
            Err(e) => {
                let err = VerifyError::Io {
                    path: path.display().to_string(),
                    reason: format!("verification task failed: {}", e),
                };
                error!("{}", err);
                VerificationResult::failed(&path, expected, err)
            }
        }
    }
}

/// Hash a whole reader in chunks of `chunk_size`, returning the digest and
/// the number of bytes consumed
pub fn digest_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<(Digest, u64)> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    Ok((Digest::from_bytes(hasher.finalize().into()), total))
}

fn open_regular_file(path: &Path) -> io::Result<File> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "path is not a regular file",
        ));
    }
    File::open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    /// Yields `good` bytes, then fails
    struct FailingReader {
        good: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::other("device error"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(0xAB);
            self.good -= n;
            Ok(n)
        }
    }

    /// Interrupts before every successful read
    struct InterruptingReader {
        inner: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_empty_input_has_known_digest() {
        let (digest, len) = digest_reader(Cursor::new(Vec::new()), 4096).unwrap();
        assert_eq!(digest.to_hex(), EMPTY_SHA256);
        assert_eq!(len, 0);
    }

    #[test]
    fn test_digest_independent_of_chunk_size() {
        for chunk_size in [1, 2, 3, 64, 4096] {
            let (digest, len) = digest_reader(Cursor::new(b"abc".to_vec()), chunk_size).unwrap();
            assert_eq!(digest.to_hex(), ABC_SHA256, "chunk size {}", chunk_size);
            assert_eq!(len, 3);
        }
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        assert_eq!(IntegrityVerifier::with_chunk_size(0).chunk_size(), 1);
        let (digest, _) = digest_reader(Cursor::new(b"abc".to_vec()), 0).unwrap();
        assert_eq!(digest.to_hex(), ABC_SHA256);
    }

    #[test]
    fn test_mid_stream_failure_is_an_error() {
        let err = digest_reader(FailingReader { good: 10_000 }, 4096).unwrap_err();
        assert_eq!(err.to_string(), "device error");
    }

    #[test]
    fn test_mid_stream_failure_reports_io_error() {
        let expected = Digest::from_hex(ABC_SHA256).unwrap();
        let result = IntegrityVerifier::new().verify_reader(
            Path::new("/snapshots/chain.tar.zst"),
            FailingReader { good: 10_000 },
            &expected,
        );

        match &result.error {
            Some(VerifyError::Io { path, reason }) => {
                assert_eq!(path, "/snapshots/chain.tar.zst");
                assert_eq!(reason, "device error");
            }
            other => panic!("expected Io error, got {:?}", other),
        }
        assert!(result.observed_digest.is_none());
        assert!(!result.matched);
        assert_eq!(result.bytes_read, 0);
        assert_eq!(result.expected_digest, expected);
    }

    #[test]
    fn test_reader_matching_expected_digest() {
        let expected = Digest::from_hex(ABC_SHA256).unwrap();
        let result = IntegrityVerifier::with_chunk_size(2).verify_reader(
            Path::new("abc"),
            Cursor::new(b"abc".to_vec()),
            &expected,
        );

        assert!(result.matched);
        assert_eq!(result.observed_digest, Some(expected));
        assert_eq!(result.bytes_read, 3);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_ensure_matched_per_result() {
        let expected = Digest::from_hex(ABC_SHA256).unwrap();
        let verifier = IntegrityVerifier::new();

        let ok = verifier.verify_reader(Path::new("abc"), Cursor::new(b"abc".to_vec()), &expected);
        assert_eq!(ok.ensure_matched(), Ok(()));

        let mismatch =
            verifier.verify_reader(Path::new("abd"), Cursor::new(b"abd".to_vec()), &expected);
        match mismatch.ensure_matched() {
            Err(BootstrapError::IntegrityMismatch {
                path,
                expected: want,
                observed,
            }) => {
                assert_eq!(path, "abd");
                assert_eq!(want, ABC_SHA256);
                assert_ne!(observed, ABC_SHA256);
            }
            other => panic!("expected IntegrityMismatch, got {:?}", other),
        }

        let failed =
            verifier.verify_reader(Path::new("dev"), FailingReader { good: 1 }, &expected);
        assert!(matches!(
            failed.ensure_matched(),
            Err(BootstrapError::Verify(VerifyError::Io { .. }))
        ));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = InterruptingReader {
            inner: Cursor::new(b"abc".to_vec()),
            interrupt_next: false,
        };
        let (digest, _) = digest_reader(reader, 1).unwrap();
        assert_eq!(digest.to_hex(), ABC_SHA256);
    }
}
