//! MySQL request log handler with connection pooling

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{error, info, warn};

use super::lazy::LazyConnection;
use crate::config::validate_identifier;
use crate::domain::{DomainError, RequestLogHandler, RequestRecord};

/// MySQL handler configuration
#[derive(Debug, Clone)]
pub struct MySqlHandlerConfig {
    /// Database connection URL
    pub url: String,
    pub table: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Create the table on first initialization if it does not exist
    pub create_table: bool,
}

impl MySqlHandlerConfig {
    pub fn new(url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
            max_connections: 10,
            create_table: false,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_create_table(mut self, create: bool) -> Self {
        self.create_table = create;
        self
    }
}

/// Inserts each request record as one row.
///
/// Every insert runs on its own pooled connection outside any transaction,
/// so MySQL's autocommit applies per row.
#[derive(Debug)]
pub struct MySqlRequestLogHandler {
    config: MySqlHandlerConfig,
    insert_query: String,
    pool: LazyConnection<MySqlPool>,
}

impl MySqlRequestLogHandler {
    pub fn new(config: MySqlHandlerConfig) -> Result<Self, DomainError> {
        validate_identifier(&config.table)?;

        Ok(Self {
            insert_query: insert_query(&config.table),
            config,
            pool: LazyConnection::new(),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.is_connected()
    }

    async fn connect(&self) -> Result<MySqlPool, DomainError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(&self.config.url)
            .await
            .map_err(|e| DomainError::connection("mysql", e.to_string()))?;

        if self.config.create_table {
            sqlx::query(&create_table_query(&self.config.table))
                .execute(&pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to create table {}: {}",
                        self.config.table, e
                    ))
                })?;
        }

        info!(table = %self.config.table, "Request monitoring connected to MySQL");

        Ok(pool)
    }
}

#[async_trait]
impl RequestLogHandler for MySqlRequestLogHandler {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn initialize(&self) -> Result<(), DomainError> {
        self.pool.get_or_connect(|| self.connect()).await.map(|_| ())
    }

    async fn log_request(&self, record: &RequestRecord) {
        let Some(pool) = self.pool.get() else {
            warn!(path = %record.url_path, "MySQL request log handler is not initialized");
            return;
        };

        let result = sqlx::query(&self.insert_query)
            .bind(record.timestamp.naive_utc())
            .bind(&record.method)
            .bind(&record.url_path)
            .bind(&record.full_url)
            .bind(record.client_ip.as_deref())
            .bind(record.user_agent.as_deref())
            .bind(&record.hostname)
            .bind(&record.route)
            .bind(record.response_time_ms)
            .bind(i32::from(record.status_code))
            .execute(pool)
            .await;

        if let Err(e) = result {
            error!(table = %self.config.table, error = %e, "Failed to log request to MySQL");
        }
    }
}

fn insert_query(table: &str) -> String {
    format!(
        "INSERT INTO {} \
         (timestamp, method, url_path, full_url, client_ip, user_agent, \
         hostname, route, response_time_ms, status_code) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        table
    )
}

fn create_table_query(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            timestamp DATETIME(6) NOT NULL,
            method VARCHAR(16) NOT NULL,
            url_path VARCHAR(2048) NOT NULL,
            full_url TEXT NOT NULL,
            client_ip VARCHAR(64) NULL,
            user_agent TEXT NULL,
            hostname VARCHAR(255) NOT NULL,
            route VARCHAR(2048) NOT NULL,
            response_time_ms DOUBLE NOT NULL,
            status_code INT NOT NULL,
            INDEX idx_timestamp (timestamp)
        )
        "#,
        table
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record() -> RequestRecord {
        RequestRecord {
            timestamp: Utc::now(),
            method: "GET".to_string(),
            url_path: "/test".to_string(),
            full_url: "http://localhost/test".to_string(),
            client_ip: None,
            user_agent: Some("curl/8.0".to_string()),
            hostname: "api-1".to_string(),
            route: "/test".to_string(),
            response_time_ms: 1.5,
            status_code: 200,
        }
    }

    #[test]
    fn test_insert_query_column_order() {
        let query = insert_query("request_logs");

        assert!(query.starts_with("INSERT INTO request_logs "));
        assert!(query.contains(
            "(timestamp, method, url_path, full_url, client_ip, user_agent, \
             hostname, route, response_time_ms, status_code)"
        ));
        assert_eq!(query.matches('?').count(), 10);
    }

    #[test]
    fn test_create_table_query_has_all_columns() {
        let query = create_table_query("request_logs");

        for column in [
            "timestamp",
            "method",
            "url_path",
            "full_url",
            "client_ip",
            "user_agent",
            "hostname",
            "route",
            "response_time_ms",
            "status_code",
        ] {
            assert!(query.contains(column), "missing column {}", column);
        }
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let config = MySqlHandlerConfig::new("mysql://localhost/app", "logs; DROP TABLE x");
        assert!(MySqlRequestLogHandler::new(config).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = MySqlHandlerConfig::new("mysql://localhost/app", "request_logs")
            .with_max_connections(4)
            .with_create_table(true);

        assert_eq!(config.max_connections, 4);
        assert!(config.create_table);
    }

    #[tokio::test]
    async fn test_log_request_before_initialize_is_swallowed() {
        let handler = MySqlRequestLogHandler::new(MySqlHandlerConfig::new(
            "mysql://localhost/app",
            "request_logs",
        ))
        .unwrap();

        handler.log_request(&record()).await;

        assert!(!handler.is_initialized());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_initialize() {
        let handler = MySqlRequestLogHandler::new(MySqlHandlerConfig::new(
            "not a database url",
            "request_logs",
        ))
        .unwrap();

        let result = handler.initialize().await;

        assert!(matches!(result, Err(DomainError::Connection { .. })));
        assert!(!handler.is_initialized());
    }
}
