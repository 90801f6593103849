//! Integration tests for access level registration and resolution

use std::sync::Arc;

use proptest::prelude::*;
use sigil_foundation::{Caller, Error, ErrorKind};
use sigil_parser::{AccessPolicy, GENERAL, GrantPredicate, IdListPredicate};
use sigil_storage::{GrantStore, MemoryStore};

// =============================================================================
// Registration
// =============================================================================

#[test]
fn duplicate_and_reserved_labels_are_rejected() {
    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level("admin", 20, |_: &Caller| Ok(false))
        .unwrap();

    let dup = builder
        .register_access_level("ADMIN", 30, |_: &Caller| Ok(false))
        .err()
        .unwrap();
    assert!(matches!(dup.kind, ErrorKind::DuplicateAccessLevel(_)));

    let reserved = builder
        .register_access_level(GENERAL, 30, |_: &Caller| Ok(false))
        .err()
        .unwrap();
    assert!(matches!(reserved.kind, ErrorKind::DuplicateAccessLevel(_)));
}

#[test]
fn levels_are_sorted_by_rank_with_general_last() {
    let mut builder = AccessPolicy::builder();
    for (label, rank) in [("mod", 85), ("owner", 20), ("helper", 90), ("admin", 30)] {
        builder
            .register_access_level(label, rank, |_: &Caller| Ok(false))
            .unwrap();
    }
    let policy = builder.build();

    let labels: Vec<&str> = policy.levels().map(|l| l.label()).collect();
    assert_eq!(labels, ["owner", "admin", "mod", "helper", "general"]);
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn most_privileged_matching_level_wins() {
    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level("mod", 60, |c: &Caller| Ok(c.id == "ann" || c.id == "bo"))
        .unwrap()
        .register_access_level("admin", 30, |c: &Caller| Ok(c.id == "ann"))
        .unwrap();
    let policy = builder.build();

    assert_eq!(policy.resolve(&Caller::new("ann")).label(), "admin");
    assert_eq!(policy.resolve(&Caller::new("bo")).label(), "mod");
    assert!(policy.resolve(&Caller::new("cy")).is_general());
}

#[test]
fn equal_ranks_resolve_in_registration_order() {
    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level("first", 50, |_: &Caller| Ok(true))
        .unwrap()
        .register_access_level("second", 50, |_: &Caller| Ok(true))
        .unwrap();
    let policy = builder.build();
    assert_eq!(policy.resolve(&Caller::new("x")).label(), "first");
}

#[test]
fn failing_predicate_fails_closed() {
    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level("admin", 30, |_: &Caller| {
            Err(Error::storage("connection refused"))
        })
        .unwrap();
    let policy = builder.build();

    let caller = Caller::new("ann");
    assert!(policy.resolve(&caller).is_general());
    assert!(!policy.authorize(&caller, "admin").unwrap());
    assert!(policy.authorize(&caller, GENERAL).unwrap());
}

#[test]
fn authorize_unknown_label_is_error() {
    let policy = AccessPolicy::builder().build();
    let err = policy.authorize(&Caller::new("x"), "wizard").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownAccessLevel(_)));
}

#[test]
fn grants_are_read_on_every_resolution() {
    let store = Arc::new(MemoryStore::new());
    let grants: Arc<dyn GrantStore> = store.clone();

    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level_with("owner", 10, IdListPredicate::new(["root"]))
        .unwrap()
        .register_access_level_with("admin", 30, GrantPredicate::new(grants, "admin"))
        .unwrap();
    let policy = builder.build();

    let ann = Caller::new("ann");
    assert!(policy.resolve(&ann).is_general());
    store.put_grant("ann", "Admin").unwrap();
    assert_eq!(policy.resolve(&ann).label(), "admin");
    store.revoke("ann").unwrap();
    assert!(policy.resolve(&ann).is_general());
}

#[test]
fn acting_as_requires_equal_or_higher_privilege() {
    let mut builder = AccessPolicy::builder();
    builder
        .register_access_level_with("owner", 10, IdListPredicate::new(["root"]))
        .unwrap()
        .register_access_level_with("admin", 30, IdListPredicate::new(["ann", "bo"]))
        .unwrap();
    let policy = builder.build();

    let root = Caller::new("root");
    let ann = Caller::new("ann");
    let bo = Caller::new("bo");
    let cy = Caller::new("cy");

    assert!(policy.sufficient(&root, &ann));
    assert!(policy.sufficient(&ann, &bo));
    assert!(policy.sufficient(&ann, &cy));
    assert!(!policy.sufficient(&ann, &root));
    assert!(!policy.sufficient(&cy, &bo));
}

// =============================================================================
// Monotonicity
// =============================================================================

proptest! {
    /// Requiring a less privileged level never locks out a caller that was
    /// authorized for a more privileged one.
    #[test]
    fn authorize_is_monotonic(
        ranks in prop::collection::vec(0u32..200, 1..6),
        members in prop::collection::vec(prop::collection::vec(0usize..4, 0..4), 1..6),
        caller in 0usize..4,
    ) {
        let mut builder = AccessPolicy::builder();
        let count = ranks.len().min(members.len());
        for i in 0..count {
            let ids: Vec<String> = members[i].iter().map(|m| format!("c{m}")).collect();
            builder
                .register_access_level_with(&format!("l{i}"), ranks[i], IdListPredicate::new(ids))
                .unwrap();
        }
        let policy = builder.build();
        let caller = Caller::new(format!("c{caller}"));

        let levels: Vec<_> = policy.levels().collect();
        for stricter in &levels {
            for looser in &levels {
                if stricter.rank() <= looser.rank()
                    && policy.authorize(&caller, stricter.label()).unwrap()
                {
                    prop_assert!(policy.authorize(&caller, looser.label()).unwrap());
                }
            }
        }
    }
}
