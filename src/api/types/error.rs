//! Client-visible error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::domain::{DomainError, Message};

/// Body of an explicit HTTP error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorBody {
    pub message: String,
}

/// Body of an access gate rejection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailBody {
    pub detail: String,
}

/// Body returned for any unhandled failure. Never carries internal details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnexpectedErrorBody {
    pub success: bool,
    pub message: String,
    pub result: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Explicit status raised by a handler
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("Invalid API key")]
    InvalidApiKey,

    /// Anything unhandled; the detail is logged, not returned
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::Http { message, .. } => (status, Json(HttpErrorBody { message })).into_response(),
            Self::InvalidApiKey => (
                status,
                Json(DetailBody {
                    detail: "Invalid API key".to_string(),
                }),
            )
                .into_response(),
            Self::Unexpected(detail) => {
                error!(detail = %detail, "Unhandled application error");

                (
                    status,
                    Json(UnexpectedErrorBody {
                        success: false,
                        message: Message::UnexpectedError.to_string(),
                        result: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_http_error_body() {
        let (status, body) = body_json(ApiError::not_found("Not Found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"message": "Not Found"}));
    }

    #[tokio::test]
    async fn test_invalid_api_key_body() {
        let (status, body) = body_json(ApiError::InvalidApiKey).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"detail": "Invalid API key"}));
    }

    #[tokio::test]
    async fn test_unexpected_error_hides_detail() {
        let (status, body) =
            body_json(ApiError::unexpected("connection string mysql://root:pw@db")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "message": "An unexpected error occurred",
                "result": null
            })
        );
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::storage("disk full").into();
        assert_eq!(api_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
