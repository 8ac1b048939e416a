//! Bounded-time watch for a node to finish catching up
//!
//! The watcher polls `/status` at a fixed interval until the node reports
//! `catching_up = false`, the deadline passes, or the caller cancels.
//!
//! # Outcomes
//!
//! - **Synced**: the latest poll reported `catching_up = false`
//! - **TimedOut**: the deadline passed after at least one successful poll
//! - **ConnectionFailed**: the deadline passed and no poll ever succeeded
//! - **Cancelled**: the cancellation signal fired while waiting
//!
//! Individual poll failures never end the watch early. A node RPC endpoint
//! is routinely unreachable for a while after the node restarts, so failures
//! are logged and retried on the next tick.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use crate::constants::rpc::UNKNOWN;
use crate::constants::watcher::MIN_POLL_INTERVAL;
use crate::errors::WatchError;
use crate::rpc::{NodeRpcClient, NodeSyncSnapshot};

/// Terminal result of a watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced(NodeSyncSnapshot),
    TimedOut(Option<NodeSyncSnapshot>),
    ConnectionFailed(WatchError),
    Cancelled(Option<NodeSyncSnapshot>),
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }

    /// Most recent snapshot the outcome carries, if any
    pub fn last_snapshot(&self) -> Option<&NodeSyncSnapshot> {
        match self {
            SyncOutcome::Synced(snapshot) => Some(snapshot),
            SyncOutcome::TimedOut(snapshot) | SyncOutcome::Cancelled(snapshot) => {
                snapshot.as_ref()
            }
            SyncOutcome::ConnectionFailed(_) => None,
        }
    }
}

/// Outcome plus how the watch got there
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub outcome: SyncOutcome,
    pub attempts: u32,
    pub elapsed: Duration,
}

pub struct SyncWatcher {
    client: NodeRpcClient,
    poll_interval: Duration,
    max_wait: Duration,
}

impl SyncWatcher {
    pub fn new(client: NodeRpcClient, poll_interval: Duration, max_wait: Duration) -> Self {
        if poll_interval < MIN_POLL_INTERVAL {
            warn!(
                "Poll interval {:?} is below the {:?} floor, using the floor",
                poll_interval, MIN_POLL_INTERVAL
            );
        }
        Self {
            client,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            max_wait,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Watch until synced or the deadline passes
    pub async fn watch(&self) -> WatchSummary {
        // Sender stays alive for the whole watch, so cancellation never fires
        let (_never_cancel, cancel) = watch::channel(false);
        self.watch_until_cancelled(cancel).await
    }

    /// Watch until synced, the deadline passes, or `cancel` becomes `true`
    pub async fn watch_until_cancelled(&self, mut cancel: watch::Receiver<bool>) -> WatchSummary {
        let started = Instant::now();
        let deadline = started + self.max_wait;
        let mut attempts: u32 = 0;
        let mut last_snapshot: Option<NodeSyncSnapshot> = None;
        let mut last_error: Option<WatchError> = None;

        info!(
            "Watching {} for sync completion (poll every {:?}, max wait {:?})",
            self.client.base_url(),
            self.poll_interval,
            self.max_wait
        );

        loop {
            attempts += 1;
            info!("Checking sync status (check #{})", attempts);

            match self.client.fetch_status().await {
                Ok(snapshot) if snapshot.is_synced() => {
                    info!(
                        "✓ Node finished syncing at height {}",
                        display_height(&snapshot)
                    );
                    return WatchSummary {
                        outcome: SyncOutcome::Synced(snapshot),
                        attempts,
                        elapsed: started.elapsed(),
                    };
                }
                Ok(snapshot) => {
                    info!(
                        "Node still syncing (height {}, catching_up = {:?})",
                        display_height(&snapshot),
                        snapshot.catching_up
                    );
                    last_snapshot = Some(snapshot);
                }
                Err(e) => {
                    warn!("Status check failed (node might still be starting): {}", e);
                    last_error = Some(e);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                let outcome = match (last_snapshot, last_error) {
                    (Some(snapshot), _) => {
                        warn!(
                            "Sync watch timed out after {:?} - last height {}",
                            self.max_wait,
                            display_height(&snapshot)
                        );
                        SyncOutcome::TimedOut(Some(snapshot))
                    }
                    (None, Some(error)) => {
                        warn!(
                            "Sync watch gave up after {:?} - node never answered: {}",
                            self.max_wait, error
                        );
                        SyncOutcome::ConnectionFailed(error)
                    }
                    // Every attempt yields a snapshot or an error
                    (None, None) => SyncOutcome::TimedOut(None),
                };
                return WatchSummary {
                    outcome,
                    attempts,
                    elapsed: started.elapsed(),
                };
            }

            let wake_at = (now + self.poll_interval).min(deadline);
            tokio::select! {
                _ = sleep_until(wake_at) => {}
                _ = cancelled(&mut cancel) => {
                    info!("Sync watch cancelled after {} checks", attempts);
                    return WatchSummary {
                        outcome: SyncOutcome::Cancelled(last_snapshot),
                        attempts,
                        elapsed: started.elapsed(),
                    };
                }
            }
        }
    }
}

/// Build a client for `rpc_endpoint` and watch it
pub async fn watch(
    rpc_endpoint: &str,
    poll_interval: Duration,
    max_wait: Duration,
    request_timeout: Duration,
) -> Result<WatchSummary, WatchError> {
    let client = NodeRpcClient::new(rpc_endpoint, request_timeout)?;
    Ok(SyncWatcher::new(client, poll_interval, max_wait).watch().await)
}

/// Resolves once `cancel` holds `true`; never resolves if the sender is gone
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn display_height(snapshot: &NodeSyncSnapshot) -> String {
    snapshot
        .latest_block_height
        .map(|h| h.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
