//! Ordered insert scheduler

use super::trigger::DebounceTimer;
use super::{ErrorCallback, SchedulerStats, StatsCells, SuccessCallback};
use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::record::Record;
use crate::store::RecordStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct AdderInner<T, S> {
    store: Arc<S>,
    config: BatchConfig,
    pending: Mutex<Vec<T>>,
    timer: DebounceTimer,
    closed: AtomicBool,
    stats: StatsCells,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl<T, S> AdderInner<T, S>
where
    T: Record + 'static,
    S: RecordStore<T> + 'static,
{
    async fn flush_pending(&self) {
        let batch = {
            let mut pending = self.pending.lock().await;
            if pending.is_empty() {
                return;
            }
            std::mem::take(&mut *pending)
        };

        let queued = batch.len();
        debug!(records = queued, "flushing queued inserts");

        match self.store.bulk_insert(batch).await {
            Ok(count) => {
                self.stats.flushes.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .records_written
                    .fetch_add(count as u64, Ordering::Relaxed);
                if let Some(on_success) = &self.on_success {
                    on_success(count);
                }
            }
            Err(err) => {
                warn!(records = queued, error = %err, "bulk insert failed, batch dropped");
                self.stats.failed_batches.fetch_add(1, Ordering::Relaxed);
                if let Some(on_error) = &self.on_error {
                    on_error(&err);
                }
            }
        }
    }
}

/// Batches independent create operations.
///
/// Unlike [`Batcher`], there is no per-identifier merge: new records
/// have no prior state to merge into, so every `add` keeps its own slot
/// and flushes reach the store in submission order. Trigger discipline
/// is shared with [`Batcher`]: debounce window, size cap, explicit
/// [`flush`] for forced drain.
///
/// [`Batcher`]: super::Batcher
/// [`flush`]: Adder::flush
pub struct Adder<T, S> {
    inner: Arc<AdderInner<T, S>>,
}

impl<T, S> Adder<T, S>
where
    T: Record + 'static,
    S: RecordStore<T> + 'static,
{
    /// Create a scheduler inserting through `store`.
    ///
    /// Fails fast with [`BatchError::Misconfigured`] on an invalid
    /// config.
    pub fn new(store: Arc<S>, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(AdderInner {
                store,
                config,
                pending: Mutex::new(Vec::new()),
                timer: DebounceTimer::new(),
                closed: AtomicBool::new(false),
                stats: StatsCells::default(),
                on_success: None,
                on_error: None,
            }),
        })
    }

    /// Attach a success callback, invoked with the count of records
    /// written after each successful flush. Attach before the first
    /// enqueue.
    pub fn on_success(mut self, callback: impl Fn(usize) + Send + Sync + 'static) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.on_success = Some(Box::new(callback));
        }
        self
    }

    /// Attach an error callback, invoked once per failed flush with the
    /// causing error. Attach before the first enqueue.
    pub fn on_error(mut self, callback: impl Fn(&BatchError) + Send + Sync + 'static) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.on_error = Some(Box::new(callback));
        }
        self
    }

    /// Enqueue a full record for creation.
    ///
    /// Restarts the debounce countdown and flushes immediately before
    /// returning when the queue reaches the size cap.
    pub async fn add(&self, record: T) -> Result<()> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BatchError::Closed);
        }

        let pending_count = {
            let mut pending = self.inner.pending.lock().await;
            pending.push(record);
            pending.len()
        };

        if pending_count >= self.inner.config.max_batch_size {
            self.inner.timer.cancel().await;
            self.inner.flush_pending().await;
        } else {
            let inner = Arc::clone(&self.inner);
            self.inner
                .timer
                .arm(self.inner.config.wait, async move {
                    inner.flush_pending().await;
                })
                .await;
        }

        Ok(())
    }

    /// Force an immediate flush of everything queued, cancelling the
    /// debounce countdown. A no-op when nothing is pending.
    pub async fn flush(&self) {
        self.inner.timer.cancel().await;
        self.inner.flush_pending().await;
    }

    /// Drain pending work and reject all further enqueues.
    pub async fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        debug!("adder shutting down, draining queued inserts");
        self.flush().await;
    }

    /// Number of records currently queued.
    pub async fn pending_len(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner.stats.snapshot()
    }
}
