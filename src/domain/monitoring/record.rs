//! Request record captured by the monitoring middleware

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed HTTP request.
///
/// A record starts out partial (request side only) and is completed once the
/// downstream handler has produced a response. Only completed records are
/// handed to a [`RequestLogHandler`](super::RequestLogHandler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url_path: String,
    pub full_url: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub hostname: String,
    pub route: String,
    pub response_time_ms: f64,
    pub status_code: u16,
}

/// Request-side fields, collected before the downstream handler runs
#[derive(Debug, Clone)]
pub struct PendingRequestRecord {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url_path: String,
    pub full_url: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub hostname: String,
    pub route: String,
}

impl PendingRequestRecord {
    /// Attaches the response details, producing a record ready to persist
    pub fn complete(self, elapsed: Duration, status_code: u16) -> RequestRecord {
        RequestRecord {
            timestamp: self.timestamp,
            method: self.method,
            url_path: self.url_path,
            full_url: self.full_url,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            hostname: self.hostname,
            route: self.route,
            response_time_ms: elapsed_millis(elapsed),
            status_code,
        }
    }
}

/// Elapsed wall time in milliseconds, rounded to two decimals
pub fn elapsed_millis(elapsed: Duration) -> f64 {
    (elapsed.as_nanos() as f64 / 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingRequestRecord {
        PendingRequestRecord {
            timestamp: Utc::now(),
            method: "GET".to_string(),
            url_path: "/items/42".to_string(),
            full_url: "http://localhost:8000/items/42?verbose=1".to_string(),
            client_ip: Some("127.0.0.1".to_string()),
            user_agent: None,
            hostname: "api-1".to_string(),
            route: "/items/{id}".to_string(),
        }
    }

    #[test]
    fn test_elapsed_millis_rounds_to_two_decimals() {
        assert_eq!(elapsed_millis(Duration::from_micros(12_345)), 12.35);
        assert_eq!(elapsed_millis(Duration::from_micros(1_001)), 1.0);
        assert_eq!(elapsed_millis(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_complete_keeps_request_fields() {
        let pending = pending();
        let timestamp = pending.timestamp;
        let record = pending.complete(Duration::from_millis(250), 201);

        assert_eq!(record.timestamp, timestamp);
        assert_eq!(record.method, "GET");
        assert_eq!(record.route, "/items/{id}");
        assert_eq!(record.client_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(record.user_agent, None);
        assert_eq!(record.response_time_ms, 250.0);
        assert_eq!(record.status_code, 201);
    }
}
