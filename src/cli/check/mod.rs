//! Check-config command - validates configuration without serving

use std::fmt::Write;

use anyhow::Context;

use crate::config::{AppConfig, MonitoringBackend};

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    print!("{}", summary(&config));
    println!("Configuration OK");

    Ok(())
}

/// Human-readable view of the resolved settings. Secrets are never printed.
pub fn summary(config: &AppConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "server:      {}:{}", config.server.host, config.server.port);
    let _ = writeln!(out, "environment: {}", config.security.environment);
    let _ = writeln!(
        out,
        "api key:     header '{}', {}",
        config.security.api_key_header,
        if config.security.api_key.is_some() { "set" } else { "not set" }
    );
    let _ = writeln!(out, "whitelist:   {}", config.security.whitelist.join(", "));

    if config.monitoring.enabled {
        let target = match config.monitoring.backend {
            MonitoringBackend::Mongo => format!(
                "mongo {}.{}",
                config.monitoring.mongo.database, config.monitoring.mongo.collection
            ),
            MonitoringBackend::Mysql => format!("mysql table {}", config.monitoring.mysql.table),
        };
        let _ = writeln!(
            out,
            "monitoring:  {} ({:?})",
            target, config.monitoring.persistence
        );
    } else {
        let _ = writeln!(out, "monitoring:  disabled");
    }

    if config.log_store.enabled {
        let collections = &config.log_store.collections;
        let _ = writeln!(
            out,
            "log store:   {} [{}, {}, {}]",
            config.log_store.database,
            collections.info_collection,
            collections.warning_collection,
            collections.error_collection
        );
    } else {
        let _ = writeln!(out, "log store:   disabled");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_hides_api_key() {
        let mut config = AppConfig::default();
        config.security.api_key = Some("top-secret".to_string());

        let text = summary(&config);
        assert!(!text.contains("top-secret"));
        assert!(text.contains("header 'x-api-key', set"));
        assert!(text.contains("monitoring:  disabled"));
    }

    #[test]
    fn test_summary_lists_log_collections() {
        let mut config = AppConfig::default();
        config.log_store.enabled = true;

        let text = summary(&config);
        assert!(text.contains("log store:   pk_logs_db [info, warning, error]"));
    }
}
