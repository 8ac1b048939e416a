use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use bootstrap::constants::defaults;
use bootstrap::{ConfigManager, IntegrityVerifier, NodeRpcClient, Reporter, SyncOutcome, SyncWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("bootstrap=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| defaults::CONFIG_PATH.to_string());

    let config_manager = ConfigManager::new(&config_path).await?;
    let config = config_manager.get_current_config();
    let reporter = Reporter::new(config.report_format);

    // Step 1: Verify the snapshot before anything touches the node
    match config_manager.expected_digest() {
        Some(expected) => {
            let verifier = IntegrityVerifier::with_chunk_size(config.chunk_size_bytes);
            let result = verifier
                .verify_blocking(config.snapshot_path.clone(), expected)
                .await;
            println!("{}", reporter.verification(&result));
            result.ensure_matched()?;
        }
        None => warn!("Snapshot verification skipped by configuration"),
    }

    // Step 2: Watch the node catch up, Ctrl-C stops the wait early
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping sync watch");
                let _ = cancel_tx.send(true);
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let client = NodeRpcClient::new(&config.rpc_url, config.rpc_timeout())?;
    let watcher = SyncWatcher::new(client.clone(), config.poll_interval(), config.max_wait());
    let summary = watcher.watch_until_cancelled(cancel_rx).await;
    println!("{}", reporter.watch(&summary));

    // Step 3: Peer overview, informational only
    match client.fetch_peers().await {
        Ok(peers) => println!("{}", reporter.peers(&peers)),
        Err(e) => warn!("Unable to fetch peer connections: {}", e),
    }

    match summary.outcome {
        SyncOutcome::Synced(_) => {
            info!("✅ Node is synced");
            Ok(())
        }
        SyncOutcome::TimedOut(_) => Err(anyhow!(
            "Node did not finish syncing within {}s",
            config.max_wait_seconds
        )),
        SyncOutcome::ConnectionFailed(e) => Err(anyhow!("Node never answered: {}", e)),
        SyncOutcome::Cancelled(_) => Err(anyhow!("Sync watch cancelled")),
    }
}
