//! Queue-backed delivery of application logs to the log store

mod dispatcher;
mod layer;
mod mongo_sink;

pub use dispatcher::{DispatcherState, LogDispatcher, DIAGNOSTIC_TARGET};
pub use layer::{LogDispatchLayer, STACK_TRACE_FIELD};
pub use mongo_sink::MongoLogSink;
