//! Health check route
//!
//! | Path | Method | Description | Session |
//! |------|--------|-------------|---------|
//! | /health | GET | Liveness and store reachability | no |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "events": 12, "reorderPolicy": "lenient" }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// Event count; absent when the store could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<usize>,
    reorder_policy: String,
}

/// GET /health
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let events = match state.store.load_all() {
        Ok(events) => Some(events.len()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read event store");
            None
        }
    };

    Json(HealthResponse {
        status: if events.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        events,
        reorder_policy: state.ordering.policy().to_string(),
    })
}
