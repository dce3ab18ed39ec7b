//! Request monitoring middleware
//!
//! Builds a [`RequestRecord`] for every request outside the skip-set and hands
//! it to a [`RequestLogHandler`] once the response exists. Requests whose
//! handler panics or is cancelled are never recorded.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::warn;

use crate::config::PersistenceMode;
use crate::domain::{PendingRequestRecord, RequestLogHandler, RequestRecord};

pub struct RequestMonitor {
    handler: Arc<dyn RequestLogHandler>,
    skip_paths: HashSet<String>,
    hostname: String,
    persistence: PersistenceMode,
}

impl RequestMonitor {
    /// Resolves the host name once; every record reuses it
    pub fn new(
        handler: Arc<dyn RequestLogHandler>,
        skip_paths: impl IntoIterator<Item = String>,
        persistence: PersistenceMode,
    ) -> Self {
        Self {
            handler,
            skip_paths: skip_paths.into_iter().collect(),
            hostname: resolve_hostname(),
            persistence,
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn should_skip(&self, path: &str) -> bool {
        self.skip_paths.contains(path)
    }

    fn collect_request_details(&self, request: &Request<Body>) -> PendingRequestRecord {
        let path = request.uri().path().to_string();

        PendingRequestRecord {
            timestamp: Utc::now(),
            method: request.method().as_str().to_string(),
            full_url: full_url(request),
            client_ip: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
            user_agent: request
                .headers()
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            hostname: self.hostname.clone(),
            route: request
                .extensions()
                .get::<MatchedPath>()
                .map(|mp| mp.as_str().to_string())
                .unwrap_or_else(|| path.clone()),
            url_path: path,
        }
    }

    async fn persist(&self, record: RequestRecord) {
        match self.persistence {
            PersistenceMode::Inline => self.handler.log_request(&record).await,
            PersistenceMode::Detached => {
                let handler = self.handler.clone();
                tokio::spawn(async move {
                    handler.log_request(&record).await;
                });
            }
        }
    }
}

pub async fn monitoring_middleware(
    State(monitor): State<Arc<RequestMonitor>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if monitor.should_skip(request.uri().path()) {
        return next.run(request).await;
    }

    // A failed initialization only costs this request its record
    let initialized = match monitor.handler.initialize().await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                backend = monitor.handler.backend(),
                error = %e,
                "Request monitoring unavailable"
            );
            false
        }
    };

    let start = Instant::now();
    let pending = monitor.collect_request_details(&request);

    let response = next.run(request).await;

    if initialized {
        let record = pending.complete(start.elapsed(), response.status().as_u16());
        monitor.persist(record).await;
    }

    response
}

/// Absolute URL of the request, rebuilt from the Host header when the
/// request line only carries a path
fn full_url(request: &Request<Body>) -> String {
    let uri = request.uri();

    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
    {
        Some(host) => format!("http://{}{}", host, path_and_query),
        None => path_and_query.to_string(),
    }
}

fn resolve_hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
