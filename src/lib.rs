mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::ServerConfig;
use services::classifier::model_manager::ModelManager;
use state::{AppState, SharedState};

pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(commands::classifier::index))
        .route("/health", get(commands::health::health_check))
        .route("/api/status", get(commands::classifier::get_model_status))
        .route("/api/predict", post(commands::classifier::predict_image))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Load the model, then serve the upload UI until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!("Poultry Health server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Model path: {:?}", config.model_path);
    info!("  Input size: {}x{} ({:?})", config.input_size, config.input_size, config.layout);
    info!("  Top-k:      {}", config.top_k);

    if !config.use_gpu {
        warn!("GPU execution providers disabled, running on CPU");
    }

    let model_manager = ModelManager::new(&config);
    model_manager.load_model().await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(config, model_manager));
    let app = router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
