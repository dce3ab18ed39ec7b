//! Request monitoring domain - records and persistence contract

mod handler;
mod record;

pub use handler::RequestLogHandler;
pub use record::{elapsed_millis, PendingRequestRecord, RequestRecord};

#[cfg(test)]
pub use handler::MockRequestLogHandler;
