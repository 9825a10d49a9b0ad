// SPDX-License-Identifier: MIT
//
// Service entry point: environment, tracing, store client, HTTP server.

use std::sync::Arc;

use notendruck_api::{AppState, build_router};
use notendruck_core::config::{ServerConfig, StoreConfig};
use notendruck_core::error::Result;
use notendruck_pipeline::Pipeline;
use notendruck_store::{AssetStore, S3ObjectStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notendruck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let store_config = StoreConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;
    info!(
        bucket = %store_config.bucket,
        region = %store_config.region,
        "Loaded configuration"
    );

    let store = Arc::new(S3ObjectStore::from_config(&store_config).await?);
    let assets = Arc::new(AssetStore::new(store));
    let pipeline = Arc::new(Pipeline::new(Arc::clone(&assets)));

    let state = AppState {
        pipeline,
        assets,
        config: Arc::new(server_config.clone()),
    };
    let router = build_router(state, &server_config)?;

    let listener = tokio::net::TcpListener::bind(&server_config.listen_addr).await?;
    info!(addr = %server_config.listen_addr, "Notendruck API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
