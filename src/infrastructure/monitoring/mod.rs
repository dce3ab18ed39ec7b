//! Request log handlers for the monitoring middleware

mod factory;
mod lazy;
mod mongo;
mod mysql;

pub use factory::RequestLogHandlerFactory;
pub use lazy::LazyConnection;
pub use mongo::{record_document, MongoRequestLogHandler};
pub use mysql::{MySqlHandlerConfig, MySqlRequestLogHandler};
