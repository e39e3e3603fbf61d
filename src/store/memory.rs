//! In-memory record store
//!
//! Backs tests and local-only call sites. Patches are applied through a
//! serde_json round-trip: the stored record is serialized to an object,
//! the patch fields overwrite top-level keys, and the result is
//! deserialized back into the record type.

use crate::error::{BatchError, Result};
use crate::record::{Record, UpdateEntry};
use crate::store::RecordStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory [`RecordStore`] keyed by record id.
pub struct MemoryStore<T> {
    records: RwLock<HashMap<String, T>>,
}

impl<T: Record + Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a record by id.
    pub async fn get(&self, id: &str) -> Option<T> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<T: Record + Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a patch to one record, yielding the updated record.
fn apply_patch<T: Record>(record: &T, entry: &UpdateEntry) -> Result<T> {
    let mut value = serde_json::to_value(record)?;
    let fields = value.as_object_mut().ok_or_else(|| {
        BatchError::Serialization("record did not serialize to an object".into())
    })?;
    for (key, patch_value) in &entry.fields {
        fields.insert(key.clone(), patch_value.clone());
    }
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl<T: Record + Clone> RecordStore<T> for MemoryStore<T> {
    async fn bulk_update(&self, entries: Vec<UpdateEntry>) -> Result<usize> {
        let mut records = self.records.write().await;

        // Patch everything before committing anything, so a bad id or a
        // patch that breaks deserialization fails the whole batch.
        let mut updated = Vec::with_capacity(entries.len());
        for entry in &entries {
            let current = records.get(&entry.id).ok_or_else(|| {
                BatchError::StoreWrite(format!("unknown record id: {}", entry.id))
            })?;
            updated.push((entry.id.clone(), apply_patch(current, entry)?));
        }

        let count = updated.len();
        for (id, record) in updated {
            records.insert(id, record);
        }

        debug!(records = count, "bulk update applied");
        Ok(count)
    }

    async fn bulk_insert(&self, batch: Vec<T>) -> Result<usize> {
        let mut records = self.records.write().await;
        let count = batch.len();
        for record in batch {
            records.insert(record.record_id().to_string(), record);
        }

        debug!(records = count, "bulk insert applied");
        Ok(count)
    }
}
