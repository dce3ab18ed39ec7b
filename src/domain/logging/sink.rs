use async_trait::async_trait;

use super::LogEntry;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Destination the log dispatcher writes entries to
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Writes one entry into the named collection
    async fn write(&self, collection: &str, entry: &LogEntry) -> Result<(), DomainError>;
}
