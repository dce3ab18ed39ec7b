//! Private API scaffold
//!
//! An axum server with:
//! - An API key gate with a public path whitelist
//! - Optional request monitoring persisted to MongoDB or MySQL
//! - Application logs shipped to per-severity MongoDB collections by a
//!   background dispatcher

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use axum::Router;
use tracing::info;

use api::middleware::{AccessGate, RequestMonitor};
use api::state::AppState;
use domain::DomainError;
use infrastructure::monitoring::RequestLogHandlerFactory;

/// Builds the request monitor when monitoring is enabled. Handlers connect
/// lazily on the first monitored request.
pub fn create_request_monitor(
    config: &AppConfig,
) -> Result<Option<Arc<RequestMonitor>>, DomainError> {
    if !config.monitoring.enabled {
        return Ok(None);
    }

    let handler = RequestLogHandlerFactory::create(&config.monitoring)?;
    info!(
        backend = handler.backend(),
        persistence = ?config.monitoring.persistence,
        "Request monitoring enabled"
    );

    Ok(Some(Arc::new(RequestMonitor::new(
        handler,
        config.monitoring.skip_paths.iter().cloned(),
        config.monitoring.persistence,
    ))))
}

/// Assembles the full application router from configuration
pub fn create_app(config: Arc<AppConfig>) -> Result<Router, DomainError> {
    let gate = Arc::new(AccessGate::from_config(&config.security)?);
    let monitor = create_request_monitor(&config)?;
    let state = AppState::new(config);

    Ok(api::create_router(state, gate, monitor))
}
