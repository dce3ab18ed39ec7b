//! Domain layer - records, log entries and the contracts their stores implement

pub mod error;
pub mod logging;
pub mod messages;
pub mod monitoring;

pub use error::DomainError;
pub use logging::{LogEntry, LogSink, MongoLogConfig, SeverityBucket};
pub use messages::Message;
pub use monitoring::{PendingRequestRecord, RequestLogHandler, RequestRecord};
