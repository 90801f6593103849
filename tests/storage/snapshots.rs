//! Integration tests for snapshots and revisions

use sigil_storage::{AliasRecord, AliasStore, GrantStore, MemoryStore};

#[test]
fn every_write_bumps_revision() {
    let store = MemoryStore::new();
    let start = store.revision();

    store.put_alias(AliasRecord::new("a", "help")).unwrap();
    store.put_grant("ann", "admin").unwrap();
    assert_eq!(store.revision(), start + 2);

    // Revoking nothing is not a write.
    assert!(!store.revoke("nobody").unwrap());
    assert_eq!(store.revision(), start + 2);
}

#[test]
fn reads_do_not_bump_revision() {
    let store = MemoryStore::new();
    store.put_alias(AliasRecord::new("a", "help")).unwrap();
    let revision = store.revision();

    let _ = store.alias("a").unwrap();
    let _ = store.aliases().unwrap();
    let _ = store.snapshot();
    assert_eq!(store.revision(), revision);
}

#[test]
fn snapshot_is_detached() {
    let store = MemoryStore::new();
    store.put_alias(AliasRecord::new("a", "help")).unwrap();
    let snapshot = store.snapshot();

    store.put_alias(AliasRecord::new("b", "help")).unwrap();
    assert_eq!(snapshot.aliases.len(), 1);
    assert_eq!(store.aliases().unwrap().len(), 2);
}

#[test]
fn restore_replaces_tables() {
    let store = MemoryStore::new();
    store.put_grant("ann", "admin").unwrap();
    let before = store.snapshot();

    store.put_grant("bo", "operator").unwrap();
    store.restore(before.clone());
    assert_eq!(store.snapshot(), before);
    assert!(store.grant("bo").unwrap().is_none());
}

#[test]
fn from_snapshot_starts_clean() {
    let source = MemoryStore::new();
    source.put_alias(AliasRecord::new("a", "help")).unwrap();

    let copy = MemoryStore::from_snapshot(source.snapshot());
    assert_eq!(copy.revision(), 0);
    assert_eq!(copy.alias("a").unwrap().unwrap().target, "help");
}
