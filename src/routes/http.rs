// GET handlers: version, processed_data

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response};

use super::AppState;

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /processed_data — fetch the upstream chain document, derive metrics,
/// and return the enriched snapshot plus rolling history. A failed fetch
/// surfaces as raw = None, which the aggregator answers with NoData; that
/// maps to 502 with an error envelope.
pub(super) async fn processed_data_handler(State(state): State<AppState>) -> Response {
    // Fetch before taking the aggregator lock; the lock is held only for the
    // synchronous derivation step.
    let raw = match state.chain_repo.fetch_chain_data().await {
        Ok(raw) => Some(raw),
        Err(e) => {
            tracing::warn!(error = %e, operation = "fetch_chain_data", "upstream fetch failed");
            None
        }
    };

    let processed = {
        let mut aggregator = match state.aggregator.lock() {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "aggregator lock poisoned");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "aggregator unavailable");
            }
        };
        aggregator.process(raw)
    };

    match processed {
        Ok(payload) => {
            // Fire-and-forget: persistence failures are logged, never surfaced.
            if let Some(repo) = &state.snapshot_repo {
                let repo = repo.clone();
                let latest = payload.latest.clone();
                tokio::spawn(async move {
                    if let Err(e) = repo.save_latest(&latest).await {
                        tracing::warn!(error = %e, operation = "save_latest", "snapshot save failed");
                    }
                });
            }
            axum::Json(serde_json::json!({
                "status": "success",
                "data": payload,
            }))
            .into_response()
        }
        Err(e) => error_response(StatusCode::BAD_GATEWAY, &e.to_string()),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
