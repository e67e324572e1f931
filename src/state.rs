//! Shared application state for the web server

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::services::classifier::model_manager::ModelManager;

pub struct AppState {
    pub config: ServerConfig,
    pub model_manager: ModelManager,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, model_manager: ModelManager) -> Self {
        Self {
            config,
            model_manager,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
