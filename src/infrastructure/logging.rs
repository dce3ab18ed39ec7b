use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggingConfig};
use crate::infrastructure::log_dispatcher::{LogDispatchLayer, LogDispatcher};

/// Target prefix of every event emitted by this crate
pub const APP_TARGET: &str = env!("CARGO_CRATE_NAME");

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the non-blocking file writers flushing until dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber: console output, optional per-severity
/// rolling files, and optional forwarding to the log dispatcher.
pub fn init_logging(
    config: &LoggingConfig,
    dispatcher: Option<Arc<LogDispatcher>>,
) -> anyhow::Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(&config.format, filter)];
    let mut file_guards = Vec::new();

    if config.files_enabled {
        for (name, level) in [
            ("info", LevelFilter::INFO),
            ("warning", LevelFilter::WARN),
            ("error", LevelFilter::ERROR),
        ] {
            let (layer, guard) = file_layer(config, name, level)?;
            layers.push(layer);
            file_guards.push(guard);
        }
    }

    if let Some(dispatcher) = dispatcher {
        layers.push(
            LogDispatchLayer::new(dispatcher)
                .with_filter(Targets::new().with_target(APP_TARGET, LevelFilter::INFO))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::info!("Logging initialized with level: {}", config.level);

    Ok(LoggingGuard {
        _file_guards: file_guards,
    })
}

fn console_layer(format: &LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed(),
    }
}

/// JSON lines for application events at or above `level`, rotated daily
fn file_layer(
    config: &LoggingConfig,
    name: &str,
    level: LevelFilter,
) -> anyhow::Result<(BoxedLayer, WorkerGuard)> {
    let directory = Path::new(&config.directory).join(name);
    std::fs::create_dir_all(&directory)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(name)
        .filename_suffix("log")
        .max_log_files(config.retention_days)
        .build(&directory)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(Targets::new().with_target(APP_TARGET, level))
        .boxed();

    Ok((layer, guard))
}
