//! Background log dispatcher
//!
//! Log events are queued on an unbounded channel and written by a single
//! worker task, so emitting never waits on the database. Entries are written
//! in the order they were emitted and each one is attempted exactly once:
//! a failed write is reported and the worker moves on.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{LogEntry, LogSink, MongoLogConfig};

/// Target for the dispatcher's own diagnostics. The dispatch layer never
/// forwards events with this target, so they cannot loop back into the queue.
pub const DIAGNOSTIC_TARGET: &str = "log_dispatcher";

enum DispatchMessage {
    Entry(Box<LogEntry>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Worker not started yet; emitted entries are buffered
    Idle,
    Running,
    /// Shutdown sentinel consumed and worker joined
    Stopped,
}

struct Lifecycle {
    state: DispatcherState,
    receiver: Option<mpsc::UnboundedReceiver<DispatchMessage>>,
    worker: Option<JoinHandle<()>>,
}

pub struct LogDispatcher {
    sender: mpsc::UnboundedSender<DispatchMessage>,
    lifecycle: Mutex<Lifecycle>,
    sink: Arc<dyn LogSink>,
    collections: Arc<MongoLogConfig>,
}

impl std::fmt::Debug for LogDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogDispatcher")
            .field("collections", &self.collections)
            .finish()
    }
}

impl LogDispatcher {
    pub fn new(sink: Arc<dyn LogSink>, collections: MongoLogConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            lifecycle: Mutex::new(Lifecycle {
                state: DispatcherState::Idle,
                receiver: Some(receiver),
                worker: None,
            }),
            sink,
            collections: Arc::new(collections),
        }
    }

    pub async fn state(&self) -> DispatcherState {
        self.lifecycle.lock().await.state
    }

    /// Spawns the worker. Calling it again while running does nothing.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;

        match lifecycle.state {
            DispatcherState::Idle => {
                let Some(receiver) = lifecycle.receiver.take() else {
                    return;
                };
                let worker = tokio::spawn(run_worker(
                    receiver,
                    self.sink.clone(),
                    self.collections.clone(),
                ));

                lifecycle.worker = Some(worker);
                lifecycle.state = DispatcherState::Running;
                info!(target: DIAGNOSTIC_TARGET, "Log dispatcher started");
            }
            DispatcherState::Running => {}
            DispatcherState::Stopped => {
                warn!(target: DIAGNOSTIC_TARGET, "Log dispatcher already stopped; not restarting");
            }
        }
    }

    /// Queues an entry without waiting.
    ///
    /// This runs inside the tracing layer, so a failed enqueue is reported on
    /// stderr rather than through `tracing`.
    pub fn emit(&self, entry: LogEntry) {
        if self.sender.send(DispatchMessage::Entry(Box::new(entry))).is_err() {
            eprintln!("log dispatcher is stopped; dropping log entry");
        }
    }

    /// Sends the shutdown sentinel and waits for the worker to drain
    /// everything queued before it. Calling it again does nothing.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;

        if lifecycle.state != DispatcherState::Running {
            return;
        }

        let _ = self.sender.send(DispatchMessage::Shutdown);

        if let Some(worker) = lifecycle.worker.take() {
            if let Err(e) = worker.await {
                error!(target: DIAGNOSTIC_TARGET, error = %e, "Log dispatcher worker failed");
            }
        }

        lifecycle.state = DispatcherState::Stopped;
        info!(target: DIAGNOSTIC_TARGET, "Log dispatcher stopped");
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<DispatchMessage>,
    sink: Arc<dyn LogSink>,
    collections: Arc<MongoLogConfig>,
) {
    while let Some(message) = receiver.recv().await {
        let entry = match message {
            DispatchMessage::Entry(entry) => entry,
            DispatchMessage::Shutdown => break,
        };

        let collection = collections.collection_for(entry.bucket());

        if let Err(e) = sink.write(collection, &entry).await {
            error!(
                target: DIAGNOSTIC_TARGET,
                collection = %collection,
                error = %e,
                "Failed to write log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use tracing::Level;

    use super::*;
    use crate::domain::logging::MockLogSink;
    use crate::domain::DomainError;

    /// Records every attempted write; messages starting with "fail" error out
    #[derive(Default)]
    struct RecordingSink {
        attempts: std::sync::Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        fn attempts(&self) -> Vec<(String, String)> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogSink for RecordingSink {
        async fn write(&self, collection: &str, entry: &LogEntry) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.attempts
                .lock()
                .unwrap()
                .push((collection.to_string(), entry.message.clone()));

            if entry.message.starts_with("fail") {
                return Err(DomainError::storage("insert rejected"));
            }
            Ok(())
        }
    }

    fn entry(level: Level, message: &str) -> LogEntry {
        LogEntry::new(Utc::now(), &level, "private_api::tests", message)
    }

    fn dispatcher(sink: Arc<RecordingSink>) -> LogDispatcher {
        LogDispatcher::new(sink, MongoLogConfig::default())
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let dispatcher = dispatcher(Arc::new(RecordingSink::default()));
        assert_eq!(dispatcher.state().await, DispatcherState::Idle);

        dispatcher.start().await;
        dispatcher.start().await;
        assert_eq!(dispatcher.state().await, DispatcherState::Running);

        dispatcher.stop().await;
        dispatcher.stop().await;
        assert_eq!(dispatcher.state().await, DispatcherState::Stopped);

        dispatcher.start().await;
        assert_eq!(dispatcher.state().await, DispatcherState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_drains_everything_emitted_before_it() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(sink.clone());
        dispatcher.start().await;

        for i in 0..50 {
            dispatcher.emit(entry(Level::INFO, &format!("entry {}", i)));
        }
        dispatcher.stop().await;

        let attempts = sink.attempts();
        assert_eq!(attempts.len(), 50);
        for (i, (_, message)) in attempts.iter().enumerate() {
            assert_eq!(message, &format!("entry {}", i));
        }
    }

    #[tokio::test]
    async fn test_failed_write_does_not_block_or_reorder() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(sink.clone());
        dispatcher.start().await;

        dispatcher.emit(entry(Level::INFO, "first"));
        dispatcher.emit(entry(Level::WARN, "fail second"));
        dispatcher.emit(entry(Level::ERROR, "third"));
        dispatcher.stop().await;

        let messages: Vec<String> = sink.attempts().into_iter().map(|(_, m)| m).collect();
        assert_eq!(messages, vec!["first", "fail second", "third"]);
    }

    #[tokio::test]
    async fn test_entries_are_routed_by_severity() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = LogDispatcher::new(
            sink.clone(),
            MongoLogConfig {
                info_collection: "app_info".to_string(),
                warning_collection: "app_warning".to_string(),
                error_collection: "app_error".to_string(),
            },
        );
        dispatcher.start().await;

        dispatcher.emit(entry(Level::DEBUG, "debug"));
        dispatcher.emit(entry(Level::INFO, "info"));
        dispatcher.emit(entry(Level::WARN, "warn"));
        dispatcher.emit(entry(Level::ERROR, "error"));
        dispatcher.stop().await;

        assert_eq!(
            sink.attempts(),
            vec![
                ("app_info".to_string(), "debug".to_string()),
                ("app_info".to_string(), "info".to_string()),
                ("app_warning".to_string(), "warn".to_string()),
                ("app_error".to_string(), "error".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_entries_emitted_before_start_are_kept() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(sink.clone());

        dispatcher.emit(entry(Level::INFO, "early"));
        dispatcher.start().await;
        dispatcher.emit(entry(Level::INFO, "late"));
        dispatcher.stop().await;

        let messages: Vec<String> = sink.attempts().into_iter().map(|(_, m)| m).collect();
        assert_eq!(messages, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_emit_after_stop_is_dropped() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher(sink.clone());
        dispatcher.start().await;
        dispatcher.stop().await;

        dispatcher.emit(entry(Level::ERROR, "too late"));

        assert!(sink.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_each_entry_written_once_to_one_collection() {
        let mut sink = MockLogSink::new();
        sink.expect_write()
            .withf(|collection, entry| collection == "error" && entry.message == "boom")
            .times(1)
            .returning(|_, _| Ok(()));

        let dispatcher = LogDispatcher::new(Arc::new(sink), MongoLogConfig::default());
        dispatcher.start().await;
        dispatcher.emit(entry(Level::ERROR, "boom"));
        dispatcher.stop().await;
    }
}
