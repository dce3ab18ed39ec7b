//! Request log handler factory for runtime backend selection

use std::sync::Arc;

use crate::config::{MonitoringBackend, MonitoringConfig};
use crate::domain::{DomainError, RequestLogHandler};

use super::mongo::MongoRequestLogHandler;
use super::mysql::{MySqlHandlerConfig, MySqlRequestLogHandler};

/// Factory for creating request log handlers
#[derive(Debug)]
pub struct RequestLogHandlerFactory;

impl RequestLogHandlerFactory {
    /// Creates the handler for the configured backend. No connection is
    /// opened here; handlers connect on their first `initialize`.
    pub fn create(config: &MonitoringConfig) -> Result<Arc<dyn RequestLogHandler>, DomainError> {
        match config.backend {
            MonitoringBackend::Mongo => {
                let connection_string = config.mongo.connection_string.clone().ok_or_else(|| {
                    DomainError::configuration("monitoring.mongo.connection_string is not set")
                })?;

                Ok(Arc::new(MongoRequestLogHandler::new(
                    connection_string,
                    config.mongo.database.clone(),
                    config.mongo.collection.clone(),
                )))
            }
            MonitoringBackend::Mysql => {
                let url = config.mysql.url.clone().ok_or_else(|| {
                    DomainError::configuration("monitoring.mysql.url is not set")
                })?;

                let handler_config = MySqlHandlerConfig::new(url, config.mysql.table.clone())
                    .with_max_connections(config.mysql.max_connections)
                    .with_create_table(config.mysql.create_table);

                Ok(Arc::new(MySqlRequestLogHandler::new(handler_config)?))
            }
        }
    }
}
