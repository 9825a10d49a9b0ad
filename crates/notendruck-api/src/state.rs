// SPDX-License-Identifier: MIT
//
// Shared application state for Axum handlers.

use std::sync::Arc;

use notendruck_core::config::ServerConfig;
use notendruck_pipeline::Pipeline;
use notendruck_store::AssetStore;

/// Cheaply cloneable state injected into every handler via `State<_>`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub assets: Arc<AssetStore>,
    pub config: Arc<ServerConfig>,
}
