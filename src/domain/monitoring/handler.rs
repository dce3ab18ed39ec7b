//! Persistence contract for request records

use async_trait::async_trait;

use super::RequestRecord;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Stores one request record per call.
///
/// Implementations own their connection and create it lazily on the first
/// `initialize` call. Concurrent first calls must still create it only once.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestLogHandler: Send + Sync {
    /// Short backend name used in diagnostics
    fn backend(&self) -> &'static str;

    /// Establishes the underlying connection or pool. Idempotent.
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Persists one record. Failures are logged and swallowed.
    async fn log_request(&self, record: &RequestRecord);
}
