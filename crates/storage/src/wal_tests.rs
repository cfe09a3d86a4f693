// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rl_core::{BindingId, RunState};
use std::io::Write as _;

fn toggle(id: &str, enabled: bool) -> Operation {
    Operation::BindingSetEnabled {
        id: BindingId::new(id),
        enabled,
    }
}

#[test]
fn wal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.wal");

    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        wal.append(&toggle("b-1", false)).unwrap();
        wal.append(&Operation::RunStateSave {
            id: BindingId::new("b-1"),
            state: RunState {
                last_error: Some("boom".into()),
                ..RunState::default()
            },
        })
        .unwrap();
    }

    let ops = Wal::replay(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], toggle("b-1", false));
    assert!(matches!(&ops[1], Operation::RunStateSave { state, .. } if state.last_error.as_deref() == Some("boom")));
}

#[test]
fn wal_sequence_continues_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.wal");

    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 0);
        assert_eq!(wal.append(&toggle("x", true)).unwrap(), 1);
    }

    let (mut wal, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops, vec![toggle("x", true)]);
    assert_eq!(wal.sequence(), 1);
    assert_eq!(wal.append(&toggle("x", false)).unwrap(), 2);
}

#[test]
fn wal_replay_nonexistent() {
    let ops = Wal::replay(Path::new("/nonexistent/path/relay.wal")).unwrap();
    assert!(ops.is_empty());
}

#[test]
fn torn_tail_is_dropped_and_log_stays_appendable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.wal");
    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        wal.append(&toggle("a", true)).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "{{\"seq\":2,\"op\":{{\"type\":\"binding_se").unwrap();
    }

    assert_eq!(Wal::replay(&path).unwrap(), vec![toggle("a", true)]);

    let (mut wal, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops, vec![toggle("a", true)]);
    assert_eq!(wal.sequence(), 1);
    wal.append(&toggle("b", false)).unwrap();
    assert_eq!(
        Wal::replay(&path).unwrap(),
        vec![toggle("a", true), toggle("b", false)]
    );
}

#[test]
fn corruption_before_tail_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.wal");
    fs::write(&path, "not json\n{\"seq\":1,\"op\":{\"type\":\"binding_delete\",\"id\":\"a\"}}\n").unwrap();
    assert!(matches!(Wal::replay(&path), Err(WalError::Json(_))));
}

#[test]
fn rewrite_replaces_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relay.wal");
    let (mut wal, _) = Wal::open(&path).unwrap();
    for _ in 0..5 {
        wal.append(&toggle("a", true)).unwrap();
    }

    wal.rewrite(&[toggle("a", false)]).unwrap();
    assert_eq!(wal.sequence(), 1);
    wal.append(&toggle("a", true)).unwrap();

    assert_eq!(
        Wal::replay(&path).unwrap(),
        vec![toggle("a", false), toggle("a", true)]
    );
    assert!(!path.with_extension("wal.tmp").exists());
}
