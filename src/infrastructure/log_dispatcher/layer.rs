//! `tracing` layer that forwards events to the log dispatcher

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::LogDispatcher;
use crate::domain::LogEntry;

/// Field name carrying a formatted error chain or backtrace
pub const STACK_TRACE_FIELD: &str = "stack_trace";

/// Turns each event into a [`LogEntry`] and emits it to the dispatcher.
///
/// Pair it with a filter (see `infrastructure::logging`) so only
/// application events reach the log store.
pub struct LogDispatchLayer {
    dispatcher: Arc<LogDispatcher>,
}

impl LogDispatchLayer {
    pub fn new(dispatcher: Arc<LogDispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl<S> Layer<S> for LogDispatchLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        let stack_trace = visitor.stack_trace.take();

        let mut entry = LogEntry::new(
            Utc::now(),
            metadata.level(),
            metadata.target(),
            visitor.message(),
        );

        if let Some(module) = metadata.module_path() {
            entry = entry.with_module(module);
        }
        // Closest thing to a function name: the innermost span
        if let Some(span) = ctx.event_span(event) {
            entry = entry.with_function(span.name());
        }
        if let Some(line) = metadata.line() {
            entry = entry.with_line_number(line);
        }
        if let Some(stack_trace) = stack_trace {
            entry = entry.with_stack_trace(stack_trace);
        }

        self.dispatcher.emit(entry);
    }
}

/// Collects the message, extra fields as `key=value`, and the stack trace
#[derive(Default)]
struct EntryVisitor {
    message: String,
    fields: String,
    stack_trace: Option<String>,
}

impl EntryVisitor {
    fn message(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            STACK_TRACE_FIELD => self.stack_trace = Some(value.to_string()),
            name => self.push_field(name, format_args!("{}", value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            STACK_TRACE_FIELD => self.stack_trace = Some(format!("{:?}", value)),
            name => self.push_field(name, format_args!("{:?}", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::domain::{DomainError, LogSink, MongoLogConfig};

    #[derive(Default)]
    struct CollectingSink {
        entries: std::sync::Mutex<Vec<(String, LogEntry)>>,
    }

    #[async_trait]
    impl LogSink for CollectingSink {
        async fn write(&self, collection: &str, entry: &LogEntry) -> Result<(), DomainError> {
            self.entries
                .lock()
                .unwrap()
                .push((collection.to_string(), entry.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_events_become_log_entries() {
        let sink = Arc::new(CollectingSink::default());
        let dispatcher = Arc::new(LogDispatcher::new(sink.clone(), MongoLogConfig::default()));
        let subscriber =
            tracing_subscriber::registry().with(LogDispatchLayer::new(dispatcher.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("load_orders");
            let _guard = span.enter();

            tracing::info!(order_id = 7, "Orders loaded");
            tracing::error!(stack_trace = "at orders.rs:10", "Order sync failed");
        });

        dispatcher.start().await;
        dispatcher.stop().await;

        let entries = sink.entries.lock().unwrap().clone();
        assert_eq!(entries.len(), 2);

        let (collection, info) = &entries[0];
        assert_eq!(collection, "info");
        assert_eq!(info.message, "Orders loaded order_id=7");
        assert_eq!(info.level, "INFO");
        assert_eq!(info.function.as_deref(), Some("load_orders"));
        assert!(info.module.as_deref().unwrap().ends_with("log_dispatcher::layer::tests"));
        assert!(info.line_number.is_some());
        assert!(info.stack_trace.is_none());

        let (collection, error) = &entries[1];
        assert_eq!(collection, "error");
        assert_eq!(error.message, "Order sync failed");
        assert_eq!(error.level_number, 40);
        assert_eq!(error.stack_trace.as_deref(), Some("at orders.rs:10"));
    }
}
