//! Custom error types for snapshot verification and sync watching
//!
//! Every failure the core can hit is represented here so callers can branch
//! on the failure kind instead of matching on error strings.

use serde::Serialize;
use std::fmt;

/// Top-level error for a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// Configuration could not be loaded or is invalid
    Config(ConfigError),

    /// Snapshot could not be read
    Verify(VerifyError),

    /// Snapshot was read but its digest differs from the reference
    IntegrityMismatch {
        path: String,
        expected: String,
        observed: String,
    },

    /// Node RPC could not be used
    Watch(WatchError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Snapshot verification error variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyError {
    /// Path does not resolve to a readable regular file
    NotFound { path: String, reason: String },

    /// Read failed part way through the stream
    Io { path: String, reason: String },
}

/// Node RPC error variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WatchError {
    /// Could not reach the RPC endpoint
    ConnectionFailure { url: String, reason: String },

    /// Request did not complete within the per-request timeout
    Timeout { url: String },

    /// Endpoint answered with a non-success HTTP status
    UnexpectedStatus { url: String, status: u16 },

    /// Body was not the expected JSON shape
    MalformedResponse { url: String, reason: String },
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(e) => write!(f, "Configuration error: {}", e),
            BootstrapError::Verify(e) => write!(f, "Verification error: {}", e),
            BootstrapError::IntegrityMismatch {
                path,
                expected,
                observed,
            } => write!(
                f,
                "Snapshot integrity failed for '{}': expected {}, got {}",
                path, expected, observed
            ),
            BootstrapError::Watch(e) => write!(f, "Node RPC error: {}", e),
            BootstrapError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::NotFound { path, reason } => {
                write!(f, "Snapshot file '{}' not found or unreadable: {}", path, reason)
            }
            VerifyError::Io { path, reason } => {
                write!(f, "Read of '{}' failed: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::ConnectionFailure { url, reason } => {
                write!(f, "Connection to {} failed: {}", url, reason)
            }
            WatchError::Timeout { url } => {
                write!(f, "Request to {} timed out", url)
            }
            WatchError::UnexpectedStatus { url, status } => {
                write!(f, "{} returned HTTP {}", url, status)
            }
            WatchError::MalformedResponse { url, reason } => {
                write!(f, "Malformed response from {}: {}", url, reason)
            }
        }
    }
}

impl std::error::Error for BootstrapError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for VerifyError {}
impl std::error::Error for WatchError {}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown url>".to_string());

        if err.is_timeout() {
            WatchError::Timeout { url }
        } else if let Some(status) = err.status() {
            WatchError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            WatchError::MalformedResponse {
                url,
                reason: err.to_string(),
            }
        } else {
            WatchError::ConnectionFailure {
                url,
                reason: err.to_string(),
            }
        }
    }
}

impl From<anyhow::Error> for BootstrapError {
    fn from(err: anyhow::Error) -> Self {
        BootstrapError::Other(err.to_string())
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<VerifyError> for BootstrapError {
    fn from(err: VerifyError) -> Self {
        BootstrapError::Verify(err)
    }
}

impl From<WatchError> for BootstrapError {
    fn from(err: WatchError) -> Self {
        BootstrapError::Watch(err)
    }
}
