//! Shared debounce trigger
//!
//! Both schedulers defer their flush behind the same cancellable
//! one-shot timer: every enqueue aborts the armed task and starts a
//! fresh countdown, so a quiet period of `wait` is what fires the flush.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// A cancellable one-shot delayed task.
///
/// At most one countdown is armed at a time. The flush itself runs as a
/// detached task once the countdown completes, so a late [`cancel`] can
/// only abort a pending countdown, never an in-flight store write.
///
/// [`cancel`]: DebounceTimer::cancel
pub(crate) struct DebounceTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceTimer {
    pub(crate) fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Cancel any armed countdown and start a fresh one that runs
    /// `flush` after `wait` elapses uninterrupted.
    pub(crate) async fn arm<F>(&self, wait: Duration, flush: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.handle.lock().await;
        if let Some(armed) = slot.take() {
            armed.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            tokio::spawn(flush);
        }));
    }

    /// Cancel the armed countdown, if any.
    pub(crate) async fn cancel(&self) {
        if let Some(armed) = self.handle.lock().await.take() {
            armed.abort();
        }
    }
}
