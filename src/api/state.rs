//! Application state shared across handlers

use std::sync::Arc;

use crate::api::docs::build_openapi;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Rendered once at startup
    pub openapi: Arc<serde_json::Value>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let openapi = Arc::new(build_openapi(&config));
        Self { config, openapi }
    }
}
