//! Integration tests for the grant table

use sigil_storage::{GrantStore, MemoryStore};

#[test]
fn put_grant_replaces() {
    let store = MemoryStore::new();
    store.put_grant("ann", "operator").unwrap();
    store.put_grant("ann", "admin").unwrap();
    assert_eq!(store.grant("ann").unwrap().as_deref(), Some("admin"));
}

#[test]
fn grants_are_ordered_by_caller() {
    let store = MemoryStore::new();
    store.put_grant("bo", "admin").unwrap();
    store.put_grant("ann", "operator").unwrap();
    assert_eq!(
        store.grants().unwrap(),
        [
            ("ann".to_string(), "operator".to_string()),
            ("bo".to_string(), "admin".to_string())
        ]
    );
}

#[test]
fn caller_ids_are_exact() {
    let store = MemoryStore::new();
    store.put_grant("Ann", "admin").unwrap();
    assert!(store.grant("ann").unwrap().is_none());
}
