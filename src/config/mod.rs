//! Application configuration

mod app_config;

pub use app_config::{
    validate_identifier, AppConfig, AppInfoConfig, LogFormat, LogStoreConfig, LoggingConfig,
    MongoMonitoringConfig, MonitoringBackend, MonitoringConfig, MysqlMonitoringConfig,
    PersistenceMode, SecurityConfig, ServerConfig, DEV_ENVIRONMENT,
};
