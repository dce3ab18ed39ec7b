//! Application log domain - entries, severity buckets and sinks

mod config;
mod entry;
mod sink;

pub use config::MongoLogConfig;
pub use entry::{
    level_descriptor, LogEntry, SeverityBucket, DEBUG_LEVEL, ERROR_LEVEL, INFO_LEVEL,
    TRACE_LEVEL, WARNING_LEVEL,
};
pub use sink::LogSink;

#[cfg(test)]
pub use sink::MockLogSink;
