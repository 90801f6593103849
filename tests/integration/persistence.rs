//! Store persistence across sessions

use std::path::PathBuf;

use sigil_runtime::{RuntimeConfig, Session, load_store};
use sigil_storage::GrantStore;

use crate::reply;

fn temp_store(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sigil_{name}_{}.msgpack", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn aliases_and_grants_survive_restart() {
    let path = temp_store("restart");
    let config = RuntimeConfig {
        store_path: Some(path.clone()),
        ..RuntimeConfig::default()
    };

    {
        let mut session = Session::new(&config).unwrap();
        reply(session.eval("alias add gz remind 5m gz"));
        reply(session.eval("grant ann admin"));
        assert!(session.persist().unwrap());
    }

    let session = Session::new(&config).unwrap();
    assert!(!session.is_dirty());
    assert_eq!(reply(session.eval("gz")), "reminder set for 5m: gz");
    assert_eq!(
        session.store().grant("ann").unwrap(),
        Some("admin".to_string())
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn removed_alias_stays_disabled_on_disk() {
    let path = temp_store("removed");
    let config = RuntimeConfig {
        store_path: Some(path.clone()),
        ..RuntimeConfig::default()
    };

    let mut session = Session::new(&config).unwrap();
    reply(session.eval("alias add gz remind 5m gz"));
    reply(session.eval("alias remove gz"));
    session.persist().unwrap();

    let snapshot = load_store(&path).unwrap();
    let record = snapshot.aliases.get("gz").unwrap();
    assert!(!record.enabled);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn corrupt_store_file_is_reported() {
    let path = temp_store("corrupt");
    std::fs::write(&path, b"not messagepack at all").unwrap();
    let config = RuntimeConfig {
        store_path: Some(path.clone()),
        ..RuntimeConfig::default()
    };

    assert!(Session::new(&config).is_err());

    let _ = std::fs::remove_file(&path);
}
