// SPDX-License-Identifier: MIT
//
// Liveness and store health endpoints.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use notendruck_store::{StoreHealth, run_health_check};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health — process liveness, no I/O.
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/printables/health — probes the bucket for every template and
/// font the batch needs, naming exactly what is missing.
pub async fn store_health(State(state): State<AppState>) -> Json<StoreHealth> {
    Json(run_health_check(&state.assets).await)
}

/// Root-level liveness route (not under /api).
pub fn liveness_router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
