use super::Config;
use crate::errors::ConfigError;
use crate::integrity::Digest;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<Config>,
    expected_digest: Option<Digest>,
}

impl ConfigManager {
    pub async fn new(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_configuration(config_path.as_ref()).await?;
        Self::from_config(config)
    }

    /// Validate an already-built config, e.g. one assembled in tests
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let expected_digest = Self::validate(&config)?;
        Ok(Self {
            current_config: Arc::new(config),
            expected_digest,
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    /// Parsed reference digest; `None` only when verification is skipped
    pub fn expected_digest(&self) -> Option<Digest> {
        self.expected_digest
    }

    async fn load_configuration(config_path: &Path) -> Result<Config, ConfigError> {
        debug!("Loading config: {}", config_path.display());

        let content = fs::read_to_string(config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;

        info!(
            "Loaded config: rpc {}, snapshot {}, poll every {}s, max wait {}s",
            config.rpc_url,
            config.snapshot_path.display(),
            config.poll_interval_seconds,
            config.max_wait_seconds
        );

        Ok(config)
    }

    fn validate(config: &Config) -> Result<Option<Digest>, ConfigError> {
        let rpc_url = config.rpc_url.trim();
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", config.rpc_url),
            });
        }

        if config.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if config.skip_verification {
            return Ok(None);
        }

        Digest::from_hex(&config.expected_digest)
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: "expected_digest".to_string(),
                reason: e.to_string(),
            })
    }
}
