// Shared test helpers: stub upstream chain-data server

use axum::{Json, Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Stub upstream whose blocks carry timestamps `start, start + step, ...` on
/// successive requests.
pub fn chain_data_app(start_timestamp: i64, step: i64) -> Router {
    let next = Arc::new(AtomicI64::new(start_timestamp));
    Router::new().route(
        "/getChainData",
        get(move || {
            let next = next.clone();
            async move {
                let ts = next.fetch_add(step, Ordering::SeqCst);
                Json(serde_json::json!({
                    "latestBlockData": {
                        "blockNumber": 1,
                        "gasUsed": 1000,
                        "gasLimit": 2000,
                        "timestamp": ts,
                        "transactionsCount": 5,
                    },
                    "networkData": { "peerCount": 5 },
                }))
            }
        }),
    )
}

/// Serves `app` on an ephemeral local port and returns its address.
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Binds and immediately drops a listener, yielding an address that refuses
/// connections.
pub async fn dead_upstream_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
