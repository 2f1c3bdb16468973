//! Side effects that may only run once a transaction has committed.

use std::fmt;

use futures_util::future::BoxFuture;

type Deferred = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Ordered list of callbacks bound to one transaction.
///
/// Callers register work with [`AfterCommit::defer`], then either
/// [`flush`](AfterCommit::flush) it after a successful commit or
/// [`discard`](AfterCommit::discard) it when the transaction is abandoned.
/// Dropping the list without flushing also discards it.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use events_backend::domain::AfterCommit;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let hits = Arc::new(AtomicUsize::new(0));
/// let mut pending = AfterCommit::default();
/// let counter = Arc::clone(&hits);
/// pending.defer(move || Box::pin(async move {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
/// pending.flush().await;
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// # });
/// ```
#[derive(Default)]
pub struct AfterCommit {
    pending: Vec<Deferred>,
}

impl AfterCommit {
    /// Register a callback to run after commit.
    pub fn defer<F>(&mut self, callback: F)
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.pending.push(Box::new(callback));
    }

    /// Number of pending callbacks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every callback in registration order.
    pub async fn flush(self) {
        for callback in self.pending {
            callback().await;
        }
    }

    /// Drop every callback without running it, returning how many were dropped.
    pub fn discard(self) -> usize {
        self.pending.len()
    }
}

impl fmt::Debug for AfterCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AfterCommit")
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::{Arc, Mutex};

    use super::*;
    use rstest::rstest;

    fn recorder(log: &Arc<Mutex<Vec<u8>>>, value: u8) -> impl FnOnce() -> BoxFuture<'static, ()> + use<> {
        let log = Arc::clone(log);
        move || {
            Box::pin(async move {
                log.lock().expect("log lock").push(value);
            })
        }
    }

    #[rstest]
    #[tokio::test]
    async fn flush_runs_callbacks_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pending = AfterCommit::default();
        pending.defer(recorder(&log, 1));
        pending.defer(recorder(&log, 2));
        assert_eq!(pending.len(), 2);

        pending.flush().await;

        assert_eq!(*log.lock().expect("log lock"), vec![1, 2]);
    }

    #[rstest]
    fn discard_never_runs_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pending = AfterCommit::default();
        pending.defer(recorder(&log, 1));

        assert_eq!(pending.discard(), 1);
        assert!(log.lock().expect("log lock").is_empty());
    }

    #[rstest]
    fn debug_reports_pending_count() {
        let mut pending = AfterCommit::default();
        assert!(pending.is_empty());
        pending.defer(|| Box::pin(async {}));
        assert_eq!(format!("{pending:?}"), "AfterCommit { pending: 1 }");
    }
}
