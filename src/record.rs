//! Record trait and patch types shared by schedulers and stores

use serde::{de::DeserializeOwned, Serialize};

/// Trait for record types managed by the schedulers.
///
/// Implement this for each entity kind (company, interview, note, ...)
/// to give the scheduler and store an identifier to key on.
///
/// # Example
///
/// ```rust,ignore
/// use prosperis_batch::Record;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Company {
///     id: String,
///     name: String,
///     stage: String,
/// }
///
/// impl Record for Company {
///     fn record_id(&self) -> &str { &self.id }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// The unique identifier of this record instance
    fn record_id(&self) -> &str;
}

/// A partial-field set for one record.
///
/// Keys are top-level field names; values replace the stored field wholesale.
/// There is no deep merge of nested structures.
pub type FieldPatch = serde_json::Map<String, serde_json::Value>;

/// One coalesced pending update bound for [`RecordStore::bulk_update`].
///
/// [`RecordStore::bulk_update`]: crate::store::RecordStore::bulk_update
#[derive(Debug, Clone)]
pub struct UpdateEntry {
    /// Record identifier
    pub id: String,
    /// Merged partial fields, last write wins per field
    pub fields: FieldPatch,
}

impl UpdateEntry {
    pub fn new(id: impl Into<String>, fields: FieldPatch) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}
