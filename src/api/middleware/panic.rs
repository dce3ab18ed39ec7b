//! Maps handler panics to the generic 500 response

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::api::types::ApiError;

/// Response factory for `tower_http::catch_panic::CatchPanicLayer::custom`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "panic with non-string payload".to_string()
    };

    ApiError::unexpected(detail).into_response()
}
