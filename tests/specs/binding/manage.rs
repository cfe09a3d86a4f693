//! Binding management specs
//!
//! Verify enable/disable/delete/status and owner filtering.

use crate::prelude::*;

fn save_track_binding(ws: &Workspace, user: &str) -> String {
    ws.create_binding(&[
        "--user",
        user,
        "--name",
        "Save new tracks",
        "--action",
        "spotify:new_saved_track",
        "--reaction",
        "spotify:save_track",
    ])
}

#[test]
fn list_is_empty_initially() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["binding", "list"])
        .passes()
        .stdout_has("No bindings");
}

#[test]
fn list_filters_by_user() {
    let ws = Workspace::empty();
    let mine = save_track_binding(&ws, "u1");
    let theirs = save_track_binding(&ws, "u2");

    ws.rl()
        .args(&["binding", "list", "--user", "u1"])
        .passes()
        .stdout_has(&mine)
        .stdout_lacks(&theirs);
}

#[test]
fn disable_and_enable_show_in_status() {
    let ws = Workspace::empty();
    let id = save_track_binding(&ws, "u1");

    ws.rl()
        .args(&["binding", "disable", &id])
        .passes()
        .stdout_has("Disabled binding");
    let status = ws
        .rl()
        .args(&["--format", "json", "binding", "status", &id])
        .passes()
        .json();
    assert_eq!(status["enabled"], false);

    ws.rl().args(&["binding", "enable", &id]).passes();
    ws.rl()
        .args(&["binding", "status", &id])
        .passes()
        .stdout_has("Enabled: true")
        .stdout_has("Last run: -");
}

#[test]
fn created_disabled_binding_is_not_run() {
    let ws = Workspace::empty();
    let id = ws.create_binding(&[
        "--user",
        "u1",
        "--name",
        "Parked",
        "--action",
        "spotify:new_saved_track",
        "--reaction",
        "spotify:save_track",
        "--disabled",
    ]);

    let report = ws.rl().args(&["--format", "json", "run"]).passes().json();
    assert_eq!(report["bindings"], 0);

    let status = ws
        .rl()
        .args(&["--format", "json", "binding", "status", &id])
        .passes()
        .json();
    assert_eq!(status["state"]["last_run_at"], serde_json::Value::Null);
}

#[test]
fn delete_removes_the_binding() {
    let ws = Workspace::empty();
    let id = save_track_binding(&ws, "u1");

    ws.rl()
        .args(&["binding", "delete", &id])
        .passes()
        .stdout_has("Deleted binding");
    ws.rl()
        .args(&["binding", "status", &id])
        .fails()
        .stderr_has("binding not found");
    ws.rl()
        .args(&["binding", "delete", &id])
        .fails()
        .stderr_has("binding not found");
}

#[test]
fn bindings_survive_restarts() {
    let ws = Workspace::empty();
    let id = save_track_binding(&ws, "u1");
    ws.rl().args(&["binding", "disable", &id]).passes();

    // Every invocation replays the store from disk
    ws.rl()
        .args(&["binding", "list"])
        .passes()
        .stdout_has(&id)
        .stdout_has("no ");
}

#[test]
fn accounts_are_listed_without_tokens() {
    let ws = Workspace::empty();
    ws.link_spotify("u1");

    ws.rl()
        .args(&["account", "list"])
        .passes()
        .stdout_has("u1")
        .stdout_has("spotify")
        .stdout_lacks("access-1")
        .stdout_lacks("refresh-1");
}
