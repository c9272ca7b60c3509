use anyhow::Result;
use chainpulse::*;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let chain_repo = Arc::new(chain_repo::ChainRepo::new(
        &app_config.upstream.chain_data_url,
        std::time::Duration::from_secs(app_config.upstream.request_timeout_secs),
    )?);
    let aggregator = Arc::new(Mutex::new(aggregator::Aggregator::new(
        &app_config.aggregation,
    )));
    let snapshot_repo = app_config
        .persistence
        .enabled
        .then(|| Arc::new(snapshot_repo::SnapshotRepo::new(&app_config.persistence.path)));

    let snapshots_processed_total = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            chain_repo: chain_repo.clone(),
            aggregator: aggregator.clone(),
            snapshot_repo: snapshot_repo.clone(),
            snapshots_processed_total,
            shutdown_rx,
        },
        worker::WorkerConfig {
            sample_interval_ms: app_config.monitoring.sample_interval_ms,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(chain_repo, aggregator, snapshot_repo);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}
