//! Coalescing update scheduler

use super::trigger::DebounceTimer;
use super::{ErrorCallback, SchedulerStats, StatsCells, SuccessCallback};
use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::record::{FieldPatch, Record, UpdateEntry};
use crate::store::RecordStore;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Pending partial updates, at most one entry per record id.
///
/// First-encounter insertion order is kept separately so flushes write
/// records in the order callers first touched them.
#[derive(Default)]
struct PendingUpdates {
    order: Vec<String>,
    entries: HashMap<String, FieldPatch>,
}

impl PendingUpdates {
    /// Merge a patch into the pending entry for `id`, creating it on
    /// first encounter. Returns true when the patch coalesced into an
    /// existing entry.
    fn merge(&mut self, id: String, fields: FieldPatch) -> bool {
        match self.entries.get_mut(&id) {
            Some(pending) => {
                // Last write wins per field
                for (key, value) in fields {
                    pending.insert(key, value);
                }
                true
            }
            None => {
                self.order.push(id.clone());
                self.entries.insert(id, fields);
                false
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Swap-drain into a batch, leaving the structure empty.
    fn take(&mut self) -> Vec<UpdateEntry> {
        let order = std::mem::take(&mut self.order);
        let mut entries = std::mem::take(&mut self.entries);
        order
            .into_iter()
            .filter_map(|id| {
                entries
                    .remove(&id)
                    .map(|fields| UpdateEntry { id, fields })
            })
            .collect()
    }
}

struct BatcherInner<T, S> {
    store: Arc<S>,
    config: BatchConfig,
    pending: Mutex<PendingUpdates>,
    timer: DebounceTimer,
    closed: AtomicBool,
    stats: StatsCells,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    _record: PhantomData<fn() -> T>,
}

impl<T, S> BatcherInner<T, S>
where
    T: Record + 'static,
    S: RecordStore<T> + 'static,
{
    /// Swap out whatever is pending and commit it as one bulk update.
    ///
    /// A no-op when nothing is pending: no store call, no callback.
    /// Failures are reported once through the error callback and the
    /// batch is dropped; by the time a retry could run the fields may
    /// have changed again, so retrying is the caller's call.
    async fn flush_pending(&self) {
        let batch = {
            let mut pending = self.pending.lock().await;
            if pending.is_empty() {
                return;
            }
            pending.take()
        };

        let queued = batch.len();
        debug!(records = queued, "flushing coalesced updates");

        match self.store.bulk_update(batch).await {
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
                warn!(records = queued, error = %err, "bulk update failed, batch dropped");
                self.stats.failed_batches.fetch_add(1, Ordering::Relaxed);
                if let Some(on_error) = &self.on_error {
                    on_error(&err);
                }
            }
        }
    }
}

/// Coalesces per-record partial updates and commits them as bulk writes.
///
/// Multiple pending updates to the same record id merge into one patch
/// (last write wins per field). A flush is triggered by a quiet period
/// of [`BatchConfig::wait`], by the pending count reaching
/// [`BatchConfig::max_batch_size`], or explicitly via [`flush`] at
/// teardown.
///
/// [`flush`]: Batcher::flush
///
/// # Example
///
/// ```rust,ignore
/// use prosperis_batch::{Batcher, BatchConfig, MemoryStore};
///
/// let store = Arc::new(MemoryStore::<Company>::new());
/// let batcher = Batcher::new(Arc::clone(&store), BatchConfig::for_autosave())?
///     .on_success(|count| tracing::debug!(count, "saved"))
///     .on_error(|err| tracing::warn!(%err, "save failed"));
///
/// batcher.update("acme", fields).await?;
/// // ... teardown:
/// batcher.flush().await;
/// ```
pub struct Batcher<T, S> {
    inner: Arc<BatcherInner<T, S>>,
}

impl<T, S> Batcher<T, S>
where
    T: Record + 'static,
    S: RecordStore<T> + 'static,
{
    /// Create a scheduler writing through `store`.
    ///
    /// Fails fast with [`BatchError::Misconfigured`] on an invalid
    /// config; configuration never fails during operation.
    pub fn new(store: Arc<S>, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(BatcherInner {
                store,
                config,
                pending: Mutex::new(PendingUpdates::default()),
                timer: DebounceTimer::new(),
                closed: AtomicBool::new(false),
                stats: StatsCells::default(),
                on_success: None,
                on_error: None,
                _record: PhantomData,
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

    /// Enqueue a partial update for the record with `id`.
    ///
    /// Merges into the already-pending patch for `id` if there is one,
    /// restarts the debounce countdown, and flushes immediately before
    /// returning when the pending count reaches the size cap. The store
    /// write itself never blocks this call unless the size cap fires.
    pub async fn update(&self, id: impl Into<String>, fields: FieldPatch) -> Result<()> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BatchError::Closed);
        }

        let pending_count = {
            let mut pending = self.inner.pending.lock().await;
            if pending.merge(id.into(), fields) {
                self.inner.stats.coalesced.fetch_add(1, Ordering::Relaxed);
            }
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

    /// Force an immediate flush of everything pending, cancelling the
    /// debounce countdown. Call sites invoke this unconditionally at
    /// teardown so no pending edits are silently dropped. A no-op when
    /// nothing is pending.
    pub async fn flush(&self) {
        self.inner.timer.cancel().await;
        self.inner.flush_pending().await;
    }

    /// Drain pending work and reject all further enqueues.
    ///
    /// An in-flight flush completes and reports through the callbacks
    /// regardless; only new `update` calls fail fast with
    /// [`BatchError::Closed`].
    pub async fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        debug!("batcher shutting down, draining pending updates");
        self.flush().await;
    }

    /// Number of distinct records currently pending.
    pub async fn pending_len(&self) -> usize {
        self.inner.pending.lock().await.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner.stats.snapshot()
    }
}
