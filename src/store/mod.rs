//! Record store boundary
//!
//! The persistent store is an external collaborator. Schedulers only see
//! the [`RecordStore`] trait and receive an injected handle at
//! construction, so call sites can run against the real table, a remote
//! proxy, or [`MemoryStore`] in tests without shared global state.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::record::{Record, UpdateEntry};
use async_trait::async_trait;

/// Capability contract for a keyed record table supporting bulk writes.
///
/// Per-call atomicity: either the whole batch is reported as written
/// (the returned count equals the batch length) or the call fails and
/// nothing is assumed written.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Apply N partial-field updates keyed by record id. Returns the
    /// number of records written.
    async fn bulk_update(&self, entries: Vec<UpdateEntry>) -> Result<usize>;

    /// Insert N full records in submission order. Returns the number of
    /// records written.
    async fn bulk_insert(&self, records: Vec<T>) -> Result<usize>;
}
