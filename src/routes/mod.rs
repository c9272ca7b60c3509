// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;
use crate::chain_repo::ChainRepo;
use crate::snapshot_repo::SnapshotRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) chain_repo: Arc<ChainRepo>,
    pub(crate) aggregator: Arc<Mutex<Aggregator>>,
    pub(crate) snapshot_repo: Option<Arc<SnapshotRepo>>,
}

pub fn app(
    chain_repo: Arc<ChainRepo>,
    aggregator: Arc<Mutex<Aggregator>>,
    snapshot_repo: Option<Arc<SnapshotRepo>>,
) -> Router {
    let state = AppState {
        chain_repo,
        aggregator,
        snapshot_repo,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/processed_data", get(http::processed_data_handler)) // GET /processed_data
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
