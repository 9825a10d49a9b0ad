// SPDX-License-Identifier: MIT
//
// Application router and middleware stack, shared by the binary and tests.

use axum::Router;
use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use axum::routing::{get, post};
use notendruck_core::config::ServerConfig;
use notendruck_core::error::{NotendruckError, Result};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Build the full application router.
///
/// Fails when the configured CORS origin cannot be parsed — a
/// misconfiguration that should abort startup, not degrade.
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let cors = build_cors_layer(config)?;

    Ok(Router::new()
        .merge(routes::health::liveness_router())
        .route("/api/printables/generate", post(routes::printables::generate))
        .route("/api/printables/retry", post(routes::printables::retry))
        .route("/api/printables/preview", post(routes::printables::preview))
        .route("/api/printables/health", get(routes::health::store_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

fn build_cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    match &config.cors_origin {
        None => Ok(CorsLayer::new()),
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|err| {
                NotendruckError::Config(format!("invalid CORS origin '{origin}': {err}"))
            })?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE]))
        }
    }
}
