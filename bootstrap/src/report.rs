//! Rendering of verification and sync results for operators
//!
//! Nothing in the core formats output; this module turns the structured
//! results into text or JSON for the binary to print.

use serde::Serialize;

use crate::config::ReportFormat;
use crate::constants::rpc::UNKNOWN;
use crate::integrity::VerificationResult;
use crate::rpc::{NodeSyncSnapshot, PeerInfo};
use crate::watcher::{SyncOutcome, WatchSummary};

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn verification(&self, result: &VerificationResult) -> String {
        match self.format {
            ReportFormat::Json => to_json(result),
            ReportFormat::Text => render_verification(result),
        }
    }

    pub fn status(&self, snapshot: &NodeSyncSnapshot) -> String {
        match self.format {
            ReportFormat::Json => to_json(snapshot),
            ReportFormat::Text => render_status(snapshot),
        }
    }

    pub fn peers(&self, peers: &[PeerInfo]) -> String {
        match self.format {
            ReportFormat::Json => to_json(peers),
            ReportFormat::Text => render_peers(peers),
        }
    }

    pub fn watch(&self, summary: &WatchSummary) -> String {
        match self.format {
            ReportFormat::Json => to_json(summary),
            ReportFormat::Text => render_watch(summary),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e))
}

fn render_verification(result: &VerificationResult) -> String {
    let observed = result
        .observed_digest
        .map(|d| d.to_hex())
        .unwrap_or_else(|| "unavailable".to_string());

    let verdict = match (&result.error, result.matched) {
        (Some(error), _) => format!("ERROR - {}", error),
        (None, true) => "verified".to_string(),
        (None, false) => "MISMATCH".to_string(),
    };

    [
        format!("Snapshot: {}", result.path.display()),
        format!("  Expected: {}", result.expected_digest),
        format!("  Observed: {}", observed),
        format!("  Bytes Read: {}", result.bytes_read),
        format!("  Integrity: {}", verdict),
    ]
    .join("\n")
}

fn render_status(snapshot: &NodeSyncSnapshot) -> String {
    [
        "Node Status:".to_string(),
        format!("  Node ID: {}", snapshot.node_id),
        format!("  Network: {}", snapshot.network),
        format!(
            "  Latest Block Height: {}",
            or_unknown(snapshot.latest_block_height)
        ),
        format!(
            "  Latest Block Time: {}",
            or_unknown(snapshot.latest_block_time.map(|t| t.to_rfc3339()))
        ),
        format!("  Catching Up: {}", or_unknown(snapshot.catching_up)),
    ]
    .join("\n")
}

fn render_peers(peers: &[PeerInfo]) -> String {
    let mut lines = vec![
        "Peer Connections:".to_string(),
        format!("  Total Peers: {}", peers.len()),
    ];
    lines.extend(
        peers
            .iter()
            .map(|peer| format!("    - {} ({})", peer.peer_id, peer.remote_address)),
    );
    lines.join("\n")
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn render_watch(summary: &WatchSummary) -> String {
    let elapsed = summary.elapsed.as_secs_f64();
    let headline = match &summary.outcome {
        SyncOutcome::Synced(_) => format!(
            "Sync: node caught up after {} checks ({:.1}s)",
            summary.attempts, elapsed
        ),
        SyncOutcome::TimedOut(_) => format!(
            "Sync: TIMED OUT after {} checks ({:.1}s), node still catching up",
            summary.attempts, elapsed
        ),
        SyncOutcome::ConnectionFailed(error) => format!(
            "Sync: FAILED after {} checks ({:.1}s), node never answered: {}",
            summary.attempts, elapsed, error
        ),
        SyncOutcome::Cancelled(_) => format!(
            "Sync: cancelled after {} checks ({:.1}s)",
            summary.attempts, elapsed
        ),
    };

    match summary.outcome.last_snapshot() {
        Some(snapshot) => format!("{}\n{}", headline, render_status(snapshot)),
        None => headline,
    }
}
