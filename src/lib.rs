//! Prosperis Batch - write-coalescing batch scheduler
//!
//! Absorbs a high-frequency stream of small mutation requests (field
//! edits, auto-saves, bulk imports) against a keyed record store and
//! converts them into fewer, larger, ordered bulk writes.
//!
//! # Architecture
//!
//! Two cooperating schedulers, both generic over a record type:
//!
//! - [`Batcher`]: coalesces "update record R with partial fields F"
//!   requests, merging pending updates per record id (last write wins
//!   per field).
//! - [`Adder`]: accumulates "create record" requests in submission
//!   order, with no per-identifier merge.
//!
//! Both flush on a debounce window (a quiet period with no new work),
//! on a size cap, or on explicit `flush()` at teardown. Flushes perform
//! one bulk write through an injected [`RecordStore`] handle and report
//! the written count (or the failure) through per-instance callbacks.
//! A failed batch is dropped and reported once; retry is a caller
//! concern.
//!
//! # Example
//!
//! ```rust,ignore
//! use prosperis_batch::{Batcher, BatchConfig, MemoryStore, Record};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::<Company>::new());
//! let batcher = Batcher::new(Arc::clone(&store), BatchConfig::for_autosave())?
//!     .on_success(|count| tracing::debug!(count, "auto-saved"))
//!     .on_error(|err| tracing::warn!(%err, "auto-save failed"));
//!
//! // Rapid edits coalesce into one write per quiet period
//! batcher.update("acme", patch).await?;
//!
//! // Teardown: drain whatever is still pending
//! batcher.flush().await;
//! ```

// Scheduler configuration
pub mod config;

// Error types
pub mod error;

// Record trait and patch types
pub mod record;

// Batcher, Adder and the shared trigger engine
pub mod scheduler;

// Record store boundary and in-memory implementation
pub mod store;

// Re-export scheduler types
pub use scheduler::{Adder, Batcher, SchedulerStats};

// Re-export configuration
pub use config::BatchConfig;

// Re-export record types
pub use record::{FieldPatch, Record, UpdateEntry};

// Re-export store types
pub use store::{MemoryStore, RecordStore};

// Re-export error types
pub use error::{BatchError, Result};
