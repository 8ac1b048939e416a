//! Node RPC client for the CometBFT `/status` and `/net_info` endpoints
//!
//! Every failure is mapped onto [`WatchError`] so the watcher can absorb it
//! and retry on the next tick.

pub mod types;

pub use types::{NodeSyncSnapshot, PeerInfo};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::errors::WatchError;
use types::{NetInfoResponse, StatusResponse};

#[derive(Debug, Clone)]
pub struct NodeRpcClient {
    client: Client,
    base_url: String,
}

impl NodeRpcClient {
    /// Create a client whose requests each time out after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WatchError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::ConnectionFailure {
                url: base_url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the node's identity and sync state from `/status`
    pub async fn fetch_status(&self) -> Result<NodeSyncSnapshot, WatchError> {
        let (url, response): (_, StatusResponse) = self.get_json("status").await?;

        match (response.result, response.error) {
            (Some(result), _) => Ok(result.into()),
            (None, Some(error)) => Err(WatchError::MalformedResponse {
                url,
                reason: error.to_string(),
            }),
            (None, None) => Err(WatchError::MalformedResponse {
                url,
                reason: "response has no result".to_string(),
            }),
        }
    }

    /// Fetch the connected peers from `/net_info`, in server order
    pub async fn fetch_peers(&self) -> Result<Vec<PeerInfo>, WatchError> {
        let (url, response): (_, NetInfoResponse) = self.get_json("net_info").await?;

        match (response.result, response.error) {
            (Some(result), _) => Ok(result.peers.into_iter().map(PeerInfo::from).collect()),
            (None, Some(error)) => Err(WatchError::MalformedResponse {
                url,
                reason: error.to_string(),
            }),
            (None, None) => Err(WatchError::MalformedResponse {
                url,
                reason: "response has no result".to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<(String, T), WatchError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                WatchError::Timeout { url: url.clone() }
            } else {
                WatchError::ConnectionFailure {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(WatchError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(WatchError::from)?;
        let parsed = serde_json::from_str::<T>(&body).map_err(|e| WatchError::MalformedResponse {
            url: url.clone(),
            reason: format!("Failed to parse JSON response: {}", e),
        })?;

        Ok((url, parsed))
    }
}
