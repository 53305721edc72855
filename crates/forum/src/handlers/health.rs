//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/readyz` - Readiness probe with a cache round-trip

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub cache: &'static str,
}

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz - Readiness probe.
///
/// Always 200: reads fall back to the store when the cache is down, so a
/// down cache degrades latency but not correctness.
pub async fn readyz(State(state): State<AppState>) -> Json<Readiness> {
    let cache = if state.cache.probe().await {
        "up"
    } else {
        "down"
    };

    Json(Readiness {
        status: "ok",
        cache,
    })
}
