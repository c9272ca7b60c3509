// Background poll worker: fetch upstream chain data on a fixed tick, run it
// through the shared aggregator, and persist the latest snapshot.

use crate::aggregator::Aggregator;
use crate::chain_repo::ChainRepo;
use crate::snapshot_repo::SnapshotRepo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, interval};

/// Repos, shared state, and shutdown for the worker.
pub struct WorkerDeps {
    pub chain_repo: Arc<ChainRepo>,
    pub aggregator: Arc<Mutex<Aggregator>>,
    pub snapshot_repo: Option<Arc<SnapshotRepo>>,
    pub snapshots_processed_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
/// Stats logging uses a real-time interval, independent of sample_interval_ms.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        chain_repo,
        aggregator,
        snapshot_repo,
        snapshots_processed_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut fetch_failures_total: u64 = 0;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let raw = match chain_repo.fetch_chain_data().await {
                        Ok(raw) => Some(raw),
                        Err(e) => {
                            fetch_failures_total += 1;
                            tracing::warn!(
                                error = %e,
                                operation = "fetch_chain_data",
                                "upstream fetch failed"
                            );
                            None
                        }
                    };

                    let processed = match aggregator.lock() {
                        Ok(mut agg) => agg.process(raw),
                        Err(e) => {
                            tracing::error!(error = %e, "aggregator lock poisoned");
                            break;
                        }
                    };

                    match processed {
                        Ok(payload) => {
                            snapshots_processed_total.fetch_add(1, Ordering::Relaxed);
                            if let Some(repo) = &snapshot_repo
                                && let Err(e) = repo.save_latest(&payload.latest).await
                            {
                                tracing::warn!(
                                    error = %e,
                                    operation = "save_latest",
                                    "snapshot save failed"
                                );
                            }
                        }
                        // No data this tick; history stays as-is.
                        Err(e) => tracing::debug!(error = %e, "tick skipped"),
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        snapshots_processed_total =
                            snapshots_processed_total.load(Ordering::Relaxed),
                        fetch_failures_total = fetch_failures_total,
                        "app stats"
                    );
                }
            }
        }
    })
}
