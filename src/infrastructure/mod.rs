//! Infrastructure layer - database-backed handlers, log delivery and logging setup

pub mod log_dispatcher;
pub mod logging;
pub mod monitoring;
