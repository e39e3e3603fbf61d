//! Scheduler-to-store integration tests
//!
//! Drives the Batcher and Adder against the in-memory store the way an
//! editable view and a bulk importer would: debounced field edits,
//! import queues, and a forced drain at teardown.

use prosperis_batch::{Adder, BatchConfig, Batcher, FieldPatch, MemoryStore, Record, RecordStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Company {
    id: String,
    name: String,
    stage: String,
    notes: String,
}

impl Record for Company {
    fn record_id(&self) -> &str {
        &self.id
    }
}

fn company(id: &str, name: &str) -> Company {
    Company {
        id: id.into(),
        name: name.into(),
        stage: "applied".into(),
        notes: String::new(),
    }
}

fn fields(value: serde_json::Value) -> FieldPatch {
    value.as_object().unwrap().clone()
}

/// Long window so only explicit flushes and the size cap write.
fn manual_config(max_batch_size: usize) -> BatchConfig {
    BatchConfig {
        wait: Duration::from_secs(300),
        max_batch_size,
    }
}

#[tokio::test]
async fn test_edit_session_coalesces_into_store() {
    let store = Arc::new(MemoryStore::new());
    store
        .bulk_insert(vec![company("acme", "Acme"), company("initech", "Initech")])
        .await
        .unwrap();

    let batcher = Batcher::new(Arc::clone(&store), manual_config(50)).unwrap();

    // A burst of edits to one record, plus one to another
    batcher
        .update("acme", fields(json!({"stage": "screening"})))
        .await
        .unwrap();
    batcher
        .update("acme", fields(json!({"stage": "onsite", "notes": "panel of 4"})))
        .await
        .unwrap();
    batcher
        .update("initech", fields(json!({"notes": "referred by Sam"})))
        .await
        .unwrap();

    // Nothing has hit the store before the drain
    assert_eq!(store.get("acme").await.unwrap().stage, "applied");

    batcher.flush().await;

    let acme = store.get("acme").await.unwrap();
    assert_eq!(acme.stage, "onsite");
    assert_eq!(acme.notes, "panel of 4");
    assert_eq!(acme.name, "Acme");
    assert_eq!(store.get("initech").await.unwrap().notes, "referred by Sam");

    let stats = batcher.stats();
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.records_written, 2);
    assert_eq!(stats.coalesced, 1);
}

#[tokio::test]
async fn test_bulk_import_through_adder() {
    let store = Arc::new(MemoryStore::new());
    let flushed = Arc::new(AtomicUsize::new(0));

    let f = Arc::clone(&flushed);
    let adder = Adder::new(Arc::clone(&store), BatchConfig::for_bulk_import())
        .unwrap()
        .on_success(move |count| {
            f.fetch_add(count, Ordering::SeqCst);
        });

    // 50 imports hit the bulk-import size cap exactly once
    for i in 0..50 {
        adder
            .add(company(&format!("import-{i}"), &format!("Company {i}")))
            .await
            .unwrap();
    }
    assert_eq!(store.len().await, 50);
    assert_eq!(flushed.load(Ordering::SeqCst), 50);

    // A trailing partial batch drains at teardown
    adder.add(company("import-50", "Company 50")).await.unwrap();
    adder.shutdown().await;
    assert_eq!(store.len().await, 51);
    assert_eq!(flushed.load(Ordering::SeqCst), 51);
}

#[tokio::test]
async fn test_unknown_record_surfaces_through_error_callback() {
    let store = Arc::new(MemoryStore::<Company>::new());
    let errors = Arc::new(AtomicUsize::new(0));

    let e = Arc::clone(&errors);
    let batcher = Batcher::new(Arc::clone(&store), manual_config(50))
        .unwrap()
        .on_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

    batcher
        .update("ghost", fields(json!({"stage": "onsite"})))
        .await
        .unwrap();
    batcher.flush().await;

    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_independent_instances_do_not_share_pending_state() {
    let store = Arc::new(MemoryStore::new());
    store
        .bulk_insert(vec![company("acme", "Acme")])
        .await
        .unwrap();

    let companies = Batcher::new(Arc::clone(&store), manual_config(50)).unwrap();
    let interviews = Batcher::new(Arc::clone(&store), manual_config(50)).unwrap();

    companies
        .update("acme", fields(json!({"stage": "offer"})))
        .await
        .unwrap();

    // Flushing the other instance must not drain this one
    interviews.flush().await;
    assert_eq!(companies.pending_len().await, 1);
    assert_eq!(store.get("acme").await.unwrap().stage, "applied");

    companies.flush().await;
    assert_eq!(store.get("acme").await.unwrap().stage, "offer");
}
