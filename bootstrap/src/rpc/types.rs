//! Node RPC response structures and the point-in-time views built from them

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::rpc::UNKNOWN;

/// What one `/status` poll reported about the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSyncSnapshot {
    pub node_id: String,
    pub network: String,
    pub latest_block_height: Option<u64>,
    pub latest_block_time: Option<DateTime<Utc>>,
    pub catching_up: Option<bool>,
}

impl NodeSyncSnapshot {
    /// Only an explicit `catching_up: false` counts as synced
    pub fn is_synced(&self) -> bool {
        self.catching_up == Some(false)
    }
}

/// One entry of the `/net_info` peer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub remote_address: String,
}

/// CometBFT `/status` response structure
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub result: Option<StatusResult>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<RpcError>,
}

// Each section tolerates `null` or a wrong shape; missing data is reported
// as unknown rather than failing the whole poll
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResult {
    #[serde(default, deserialize_with = "lenient")]
    pub node_info: Option<NodeInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub sync_info: Option<SyncInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfo {
    pub id: Option<Value>,
    pub network: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncInfo {
    // String on CometBFT, number on some proxies
    pub latest_block_height: Option<Value>,
    pub latest_block_time: Option<Value>,
    pub catching_up: Option<Value>,
}

/// CometBFT `/net_info` response structure
#[derive(Debug, Clone, Deserialize)]
pub struct NetInfoResponse {
    pub result: Option<NetInfoResult>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetInfoResult {
    #[serde(default, deserialize_with = "lenient_list")]
    pub peers: Vec<Peer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Peer {
    #[serde(default, deserialize_with = "lenient")]
    pub node_info: Option<PeerNodeInfo>,
    pub remote_ip: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeerNodeInfo {
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(data) => write!(f, "RPC error {}: {} ({})", self.code, self.message, data),
            None => write!(f, "RPC error {}: {}", self.code, self.message),
        }
    }
}

impl From<StatusResult> for NodeSyncSnapshot {
    fn from(result: StatusResult) -> Self {
        let node = result.node_info.unwrap_or_default();
        let sync = result.sync_info.unwrap_or_default();
        Self {
            node_id: string_or_unknown(node.id.as_ref()),
            network: string_or_unknown(node.network.as_ref()),
            latest_block_height: sync.latest_block_height.as_ref().and_then(parse_height),
            latest_block_time: sync.latest_block_time.as_ref().and_then(parse_block_time),
            catching_up: sync.catching_up.as_ref().and_then(parse_flag),
        }
    }
}

impl From<Peer> for PeerInfo {
    fn from(peer: Peer) -> Self {
        let node = peer.node_info.unwrap_or_default();
        Self {
            peer_id: string_or_unknown(node.id.as_ref()),
            remote_address: string_or_unknown(peer.remote_ip.as_ref()),
        }
    }
}

/// `None` for `null` or anything that is not a `T`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the entries that are a `T`, in order; anything but an array is empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn string_or_unknown(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => UNKNOWN.to_string(),
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}

fn parse_height(value: &Value) -> Option<u64> {
    let height = match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    if height.is_none() {
        debug!("Ignoring unparsable block height: {}", value);
    }
    height
}

fn parse_block_time(value: &Value) -> Option<DateTime<Utc>> {
    let Value::String(value) = value else {
        debug!("Ignoring non-string block time: {}", value);
        return None;
    };
    match DateTime::parse_from_rfc3339(value) {
        Ok(time) => Some(time.with_timezone(&Utc)),
        Err(e) => {
            debug!("Ignoring unparsable block time '{}': {}", value, e);
            None
        }
    }
}
