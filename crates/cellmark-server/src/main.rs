//! Cellmark annotation server
//!
//! Stores per-image annotation files and serves dataset stats and exports.
//!
//! ## Endpoints
//!
//! ```text
//! GET    /health
//! POST   /api/save_annotation          { "image_id": "...", "annotations": [...] }
//! GET    /api/load_annotation/{image_id}
//! DELETE /api/annotation/{image_id}
//! GET    /api/download/{image_id}/{json|csv}
//! GET    /api/stats
//! GET    /api/export
//! ```

mod config;
mod error;
mod routes;

use cellmark_core::storage::FileStorage;
use config::ServerConfig;
use error::{ServerError, ServerResult};
use routes::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cellmark_server=info,cellmark_core=info,tower_http=info".into()),
        )
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> ServerResult<()> {
    let config = ServerConfig::from_env()?;
    let storage = match &config.data_dir {
        Some(dir) => FileStorage::new(dir.clone()),
        None => FileStorage::default_location(),
    }?;
    info!("Annotation files in {}", storage.base_path().display());

    let registry = config.class_registry()?;
    info!("{} annotation classes", registry.len());

    let state = Arc::new(AppState { storage, registry });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    info!("Cellmark server listening on {}", config.bind);
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
