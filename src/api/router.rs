use std::sync::Arc;

use axum::{http::StatusCode, middleware, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use super::docs;
use super::health;
use super::middleware::{
    access_gate_middleware, handle_panic, monitoring_middleware, AccessGate, RequestMonitor,
};
use super::sample;
use super::state::AppState;
use super::types::ApiError;

/// Create the full router with application state
///
/// Layer order from the handler outwards: access gate, request monitoring
/// (when enabled), panic recovery, CORS, HTTP tracing.
pub fn create_router(
    state: AppState,
    gate: Arc<AccessGate>,
    monitor: Option<Arc<RequestMonitor>>,
) -> Router {
    let mut router = Router::new()
        .route("/", get(docs::root_redirect))
        .route("/health-check", get(health::health_check))
        .route(docs::OPENAPI_PATH, get(docs::openapi_json))
        .route("/pdocs", get(docs::docs_page))
        .merge(sample::create_sample_router())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(gate, access_gate_middleware));

    if let Some(monitor) = monitor {
        router = router.layer(middleware::from_fn_with_state(monitor, monitoring_middleware));
    }

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
