//! Write-coalescing schedulers
//!
//! Two cooperating schedulers sit between high-frequency callers and the
//! record store:
//!
//! - [`Batcher`] coalesces partial updates per record id and commits
//!   them as one bulk update.
//! - [`Adder`] accumulates independent create operations and commits
//!   them as one bulk insert, in submission order.
//!
//! Both share the same trigger discipline: a debounce window that
//! restarts on every enqueue, a size cap that flushes immediately, and
//! an explicit `flush()` for forced drain on teardown. Flush swaps the
//! pending structure for an empty one before writing, so enqueues that
//! arrive during an in-flight write land in a fresh batch.

mod adder;
mod batcher;
mod trigger;

pub use adder::Adder;
pub use batcher::Batcher;

use crate::error::BatchError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked with the record count after a successful flush
pub type SuccessCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Callback invoked with the failure after a failed flush
pub type ErrorCallback = Box<dyn Fn(&BatchError) + Send + Sync>;

/// Point-in-time counters for one scheduler instance.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    /// Batches written successfully
    pub flushes: u64,
    /// Records written across all successful flushes
    pub records_written: u64,
    /// Batches dropped after a failed store write
    pub failed_batches: u64,
    /// Updates merged into an already-pending entry (always 0 for Adder)
    pub coalesced: u64,
}

/// Atomic backing for [`SchedulerStats`].
#[derive(Default)]
pub(crate) struct StatsCells {
    pub(crate) flushes: AtomicU64,
    pub(crate) records_written: AtomicU64,
    pub(crate) failed_batches: AtomicU64,
    pub(crate) coalesced: AtomicU64,
}

impl StatsCells {
    pub(crate) fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            flushes: self.flushes.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}
