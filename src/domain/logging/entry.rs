//! Application log entries and severity routing

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Numeric level at or above which an entry is an error
pub const ERROR_LEVEL: u32 = 40;
/// Numeric level at or above which an entry is a warning
pub const WARNING_LEVEL: u32 = 30;
pub const INFO_LEVEL: u32 = 20;
pub const DEBUG_LEVEL: u32 = 10;
pub const TRACE_LEVEL: u32 = 5;

/// Destination bucket for a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBucket {
    Info,
    Warning,
    Error,
}

impl SeverityBucket {
    /// Maps a numeric level to exactly one bucket
    pub fn from_level_number(level_number: u32) -> Self {
        if level_number >= ERROR_LEVEL {
            Self::Error
        } else if level_number >= WARNING_LEVEL {
            Self::Warning
        } else {
            Self::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level name and number for a `tracing` level
pub fn level_descriptor(level: &tracing::Level) -> (&'static str, u32) {
    match *level {
        tracing::Level::ERROR => ("ERROR", ERROR_LEVEL),
        tracing::Level::WARN => ("WARNING", WARNING_LEVEL),
        tracing::Level::INFO => ("INFO", INFO_LEVEL),
        tracing::Level::DEBUG => ("DEBUG", DEBUG_LEVEL),
        _ => ("TRACE", TRACE_LEVEL),
    }
}

/// One application log event, as stored in the log database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub level_number: u32,
    pub message: String,
    pub logger: String,
    pub module: Option<String>,
    pub function: Option<String>,
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl LogEntry {
    pub fn new(
        created: DateTime<Utc>,
        level: &tracing::Level,
        logger: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let (level_name, level_number) = level_descriptor(level);

        Self {
            timestamp: created.to_rfc3339_opts(SecondsFormat::Micros, true),
            level: level_name.to_string(),
            level_number,
            message: message.into(),
            logger: logger.into(),
            module: None,
            function: None,
            line_number: None,
            stack_trace: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_line_number(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn bucket(&self) -> SeverityBucket {
        SeverityBucket::from_level_number(self.level_number)
    }
}
