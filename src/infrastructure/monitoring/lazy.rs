//! Connection that is established once, on first use

use std::future::Future;

use tokio::sync::OnceCell;

use crate::domain::DomainError;

/// Holds a connection or pool created by the first successful `get_or_connect`.
///
/// Concurrent callers wait on the same initialization; a failed attempt
/// leaves the slot empty so the next caller tries again.
#[derive(Debug)]
pub struct LazyConnection<T> {
    cell: OnceCell<T>,
}

impl<T> Default for LazyConnection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazyConnection<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> Result<&T, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        self.cell.get_or_try_init(connect).await
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_concurrent_initialization_connects_once() {
        let connection = Arc::new(LazyConnection::<usize>::new());
        let connects = Arc::new(AtomicUsize::new(0));

        let tasks = (0..16).map(|_| {
            let connection = connection.clone();
            let connects = connects.clone();
            tokio::spawn(async move {
                connection
                    .get_or_connect(|| async move {
                        let id = connects.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(id)
                    })
                    .await
                    .map(|v| *v)
            })
        });

        let results = futures::future::join_all(tasks).await;

        assert_eq!(connects.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap().unwrap(), 0);
        }
        assert!(connection.is_connected());
    }

    #[tokio::test]
    async fn test_repeated_initialization_is_idempotent() {
        let connection = LazyConnection::<&'static str>::new();
        let mut connects = 0;

        for _ in 0..3 {
            connection
                .get_or_connect(|| {
                    connects += 1;
                    async { Ok("pool") }
                })
                .await
                .unwrap();
        }

        assert_eq!(connects, 1);
        assert_eq!(connection.get(), Some(&"pool"));
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let connection = LazyConnection::<u8>::new();

        let first = connection
            .get_or_connect(|| async { Err(DomainError::connection("test", "refused")) })
            .await;
        assert!(first.is_err());
        assert!(!connection.is_connected());
        assert!(connection.get().is_none());

        let second = connection.get_or_connect(|| async { Ok(7) }).await;
        assert_eq!(second.unwrap(), &7);
        assert!(connection.is_connected());
    }
}
