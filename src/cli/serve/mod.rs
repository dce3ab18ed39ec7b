//! Serve command - runs the API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::DomainError;
use crate::infrastructure::log_dispatcher::{LogDispatcher, MongoLogSink};
use crate::infrastructure::logging;

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let log_store = LogStore::connect(&config).await;
    let dispatcher = log_store.dispatcher();
    let _logging_guard = logging::init_logging(&config.logging, dispatcher.clone())?;

    // Reported once logging exists; the server runs on file logging alone
    if let LogStore::Unavailable(e) = &log_store {
        warn!(error = %e, "Failed to initialize MongoDB logging; continuing with file logging only");
    }

    if let Some(dispatcher) = &dispatcher {
        dispatcher.start().await;
    }

    let addr = build_socket_addr(&config)?;
    let app = crate::create_app(Arc::new(config))?;

    info!("Starting API server on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    info!("API server shutdown complete");

    // Drain queued log entries before the process exits
    if let Some(dispatcher) = &dispatcher {
        dispatcher.stop().await;
    }

    served.map_err(Into::into)
}

/// Outcome of connecting the database log store at startup
enum LogStore {
    Disabled,
    Connected(Arc<LogDispatcher>),
    Unavailable(DomainError),
}

impl LogStore {
    async fn connect(config: &AppConfig) -> Self {
        if !config.log_store.enabled {
            return Self::Disabled;
        }

        let Some(connection_string) = config.log_store.connection_string.as_deref() else {
            return Self::Unavailable(DomainError::configuration(
                "log_store.connection_string is not set",
            ));
        };

        match MongoLogSink::connect(connection_string, &config.log_store.database).await {
            Ok(sink) => Self::Connected(Arc::new(LogDispatcher::new(
                Arc::new(sink),
                config.log_store.collections.clone(),
            ))),
            Err(e) => Self::Unavailable(e),
        }
    }

    fn dispatcher(&self) -> Option<Arc<LogDispatcher>> {
        match self {
            Self::Connected(dispatcher) => Some(dispatcher.clone()),
            Self::Disabled | Self::Unavailable(_) => None,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
