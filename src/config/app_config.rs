use axum::http::HeaderName;
use serde::Deserialize;

use crate::domain::{DomainError, MongoLogConfig};

/// Environment name that disables the API key gate
pub const DEV_ENVIRONMENT: &str = "dev";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppInfoConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub monitoring: MonitoringConfig,
    pub log_store: LogStoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppInfoConfig {
    pub title: String,
    pub description: String,
    /// Target of the `GET /` redirect
    pub root_redirect: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Write per-severity rolling files under `directory`
    pub files_enabled: bool,
    pub directory: String,
    pub retention_days: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub environment: String,
    pub api_key_header: String,
    pub api_key: Option<String>,
    /// Paths served without an API key
    pub whitelist: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub backend: MonitoringBackend,
    pub persistence: PersistenceMode,
    /// Paths that are never recorded
    pub skip_paths: Vec<String>,
    pub mongo: MongoMonitoringConfig,
    pub mysql: MysqlMonitoringConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringBackend {
    #[default]
    Mongo,
    Mysql,
}

/// How the monitoring middleware hands records to the persistence handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Persist on a spawned task after the response is produced
    #[default]
    Detached,
    /// Await persistence before returning the response
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MongoMonitoringConfig {
    pub connection_string: Option<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MysqlMonitoringConfig {
    pub url: Option<String>,
    pub table: String,
    pub max_connections: u32,
    pub create_table: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogStoreConfig {
    pub enabled: bool,
    pub connection_string: Option<String>,
    pub database: String,
    pub collections: MongoLogConfig,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            title: "API System".to_string(),
            description: "Private APIs".to_string(),
            root_redirect: "https://YOURDOMAIN.com".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            files_enabled: true,
            directory: "log".to_string(),
            retention_days: 30,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            api_key_header: "x-api-key".to_string(),
            api_key: None,
            whitelist: ["/pdocs", "/openapi.json", "/health-check", "/"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SecurityConfig {
    pub fn is_development(&self) -> bool {
        self.environment == DEV_ENVIRONMENT
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: MonitoringBackend::default(),
            persistence: PersistenceMode::default(),
            skip_paths: [
                "/docs",
                "/redoc",
                "/openapi.json",
                "/metrics",
                "/health",
                "/favicon.ico",
                "/private-docs",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            mongo: MongoMonitoringConfig::default(),
            mysql: MysqlMonitoringConfig::default(),
        }
    }
}

impl Default for MongoMonitoringConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            database: "monitoring".to_string(),
            collection: "requests".to_string(),
        }
    }
}

impl Default for MysqlMonitoringConfig {
    fn default() -> Self {
        Self {
            url: None,
            table: "request_logs".to_string(),
            max_connections: 10,
            create_table: false,
        }
    }
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            connection_string: None,
            database: "pk_logs_db".to_string(),
            collections: MongoLogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from files, `APP__*` variables and the flat
    /// variables used by existing deployments (`ENVIRONMENT`, `API_KEY_*`,
    /// `MONGO_CONNECTION_STRING`, `MYSQL_CONNECTION_STRING`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let mongo_url = env_var("MONGO_CONNECTION_STRING");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("security.environment", env_var("ENVIRONMENT"))?
            .set_override_option("security.api_key_header", env_var("API_KEY_HEADER_NAME"))?
            .set_override_option("security.api_key", env_var("API_KEY_PASSPHRASE"))?
            .set_override_option("monitoring.mongo.connection_string", mongo_url.clone())?
            .set_override_option("log_store.connection_string", mongo_url)?
            .set_override_option("monitoring.mysql.url", env_var("MYSQL_CONNECTION_STRING"))?
            .build()?;

        config.try_deserialize()
    }

    /// Rejects combinations the server cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        HeaderName::from_bytes(self.security.api_key_header.as_bytes()).map_err(|_| {
            DomainError::configuration(format!(
                "Invalid API key header name: '{}'",
                self.security.api_key_header
            ))
        })?;

        let has_api_key = self
            .security
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty());

        if !self.security.is_development() && !has_api_key {
            return Err(DomainError::configuration(format!(
                "An API key is required when environment is '{}'",
                self.security.environment
            )));
        }

        if self.monitoring.enabled {
            match self.monitoring.backend {
                MonitoringBackend::Mongo => {
                    require(&self.monitoring.mongo.connection_string, "monitoring.mongo.connection_string")?;
                }
                MonitoringBackend::Mysql => {
                    require(&self.monitoring.mysql.url, "monitoring.mysql.url")?;
                    validate_identifier(&self.monitoring.mysql.table)?;
                }
            }
        }

        if self.log_store.enabled {
            require(&self.log_store.connection_string, "log_store.connection_string")?;
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn require(value: &Option<String>, key: &str) -> Result<(), DomainError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(DomainError::configuration(format!("'{}' must be set", key))),
    }
}

/// Accepts plain SQL identifiers, optionally schema-qualified
pub fn validate_identifier(name: &str) -> Result<(), DomainError> {
    let valid = !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        });

    if valid {
        Ok(())
    } else {
        Err(DomainError::configuration(format!("Invalid table name: '{}'", name)))
    }
}
