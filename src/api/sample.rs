//! Sample protected routes

use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::state::AppState;
use super::types::ApiError;
use crate::domain::Message;

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<Value>,
}

impl ApiResponse {
    pub fn ok(message: Message, result: Value) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            result: Some(result),
        }
    }
}

pub fn create_sample_router() -> Router<AppState> {
    Router::new()
        .route("/test", get(test_endpoint))
        .route("/test/{item_id}", get(test_item))
}

async fn test_endpoint() -> Json<ApiResponse> {
    info!("Sample endpoint called");
    Json(ApiResponse::ok(Message::OperationSuccess, json!({"items": []})))
}

async fn test_item(Path(item_id): Path<i64>) -> Result<Json<ApiResponse>, ApiError> {
    if item_id <= 0 {
        return Err(ApiError::bad_request(Message::InvalidInput.as_str()));
    }

    Ok(Json(ApiResponse::ok(
        Message::OperationSuccess,
        json!({"item_id": item_id}),
    )))
}
