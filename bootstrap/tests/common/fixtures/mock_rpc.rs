//! Mock RPC server for testing node status polling
//!
//! This simulates CometBFT RPC responses without requiring a real node.

use serde_json::{json, Value};
use std::net::TcpListener;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mock RPC server that simulates blockchain node responses
pub struct MockRpcServer {
    pub server: MockServer,
    pub base_url: String,
}

/// Base URL on which nothing is listening
pub fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind a local port");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// `/status` body as CometBFT serves it
pub fn status_body(network: &str, latest_block: u64, catching_up: bool) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "node_info": {
                "id": "f3b1c2d4e5a6978812345678901234567890abcd",
                "network": network,
                "moniker": "test-node"
            },
            "sync_info": {
                "latest_block_height": latest_block.to_string(),
                "latest_block_time": "2025-01-25T12:00:00.123456789Z",
                "catching_up": catching_up
            }
        }
    })
}

impl MockRpcServer {
    /// Create a new mock RPC server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Mock healthy synced node
    pub async fn mock_healthy_synced(&self, network: &str, latest_block: u64) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(status_body(network, latest_block, false)),
            )
            .mount(&self.server)
            .await;
    }

    /// Synced node that must be polled exactly `times` times
    pub async fn mock_synced_expecting(&self, network: &str, latest_block: u64, times: u64) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(status_body(network, latest_block, false)),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock node that is catching up (syncing)
    pub async fn mock_catching_up(&self, network: &str, latest_block: u64) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(status_body(network, latest_block, true)),
            )
            .mount(&self.server)
            .await;
    }

    /// Catching up for the first `times` polls only
    pub async fn mock_catching_up_times(&self, network: &str, latest_block: u64, times: u64) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(status_body(network, latest_block, true)),
            )
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Mock multiple sequential responses (for testing state changes)
    pub async fn mock_progressive_sync(&self, network: &str, heights: Vec<u64>) {
        for (i, height) in heights.iter().enumerate() {
            let catching_up = i < heights.len() - 1;
            Mock::given(method("GET"))
                .and(path("/status"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(status_body(network, *height, catching_up)),
                )
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Mock an error status on one endpoint
    pub async fn mock_error(&self, endpoint: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a raw JSON body on one endpoint
    pub async fn mock_json(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a response slower than the client timeout
    pub async fn mock_slow_status(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(status_body("celestia", 1, false))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock `/net_info` with `(id, remote_ip)` peers in the given order
    pub async fn mock_net_info(&self, peers: &[(&str, &str)]) {
        let peers: Vec<Value> = peers
            .iter()
            .map(|(id, ip)| {
                json!({
                    "node_info": { "id": id, "moniker": "peer" },
                    "is_outbound": true,
                    "remote_ip": ip
                })
            })
            .collect();

        self.mock_json(
            "/net_info",
            json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "listening": true,
                    "n_peers": peers.len().to_string(),
                    "peers": peers
                }
            }),
        )
        .await;
    }
}
