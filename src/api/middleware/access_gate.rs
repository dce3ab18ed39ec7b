//! API key gate middleware

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::types::ApiError;
use crate::config::SecurityConfig;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Reject,
}

/// Allows a request when running in dev mode, when its path is whitelisted,
/// or when the configured header carries exactly the configured key.
#[derive(Debug, Clone)]
pub struct AccessGate {
    development: bool,
    header_name: HeaderName,
    api_key: Option<String>,
    whitelist: HashSet<String>,
}

impl AccessGate {
    pub fn new(
        development: bool,
        header_name: HeaderName,
        api_key: Option<String>,
        whitelist: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            development,
            header_name,
            api_key: api_key.filter(|key| !key.is_empty()),
            whitelist: whitelist.into_iter().collect(),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, DomainError> {
        let header_name = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|_| {
            DomainError::configuration(format!(
                "Invalid API key header name: '{}'",
                config.api_key_header
            ))
        })?;

        Ok(Self::new(
            config.is_development(),
            header_name,
            config.api_key.clone(),
            config.whitelist.iter().cloned(),
        ))
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn check(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        if self.development || self.whitelist.contains(path) {
            return GateDecision::Allow;
        }

        let provided = headers
            .get(&self.header_name)
            .and_then(|value| value.to_str().ok());

        match (provided, self.api_key.as_deref()) {
            (Some(provided), Some(expected)) if provided == expected => GateDecision::Allow,
            _ => GateDecision::Reject,
        }
    }
}

pub async fn access_gate_middleware(
    State(gate): State<Arc<AccessGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.check(request.uri().path(), request.headers()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Reject => {
            debug!(path = %request.uri().path(), "Rejected request without a valid API key");
            ApiError::InvalidApiKey.into_response()
        }
    }
}
