//! Binding creation specs
//!
//! Verify configs are validated and normalized before anything is stored.

use crate::prelude::*;

fn create(ws: &Workspace, reaction_config: &str) -> Output {
    ws.rl()
        .args(&[
            "--format",
            "json",
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Liked to playlist",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:add_track_to_playlist",
            "--reaction-config",
            reaction_config,
        ])
        .passes()
}

#[test]
fn playlist_url_is_normalized_to_an_id() {
    let ws = Workspace::empty();
    let config = format!(
        r#"{{"playlistId": "https://open.spotify.com/playlist/{PLAYLIST}?si=abc"}}"#
    );
    let binding = create(&ws, &config).json();

    assert_eq!(binding["reaction"]["config"], json!({ "playlistId": PLAYLIST }));
    assert_eq!(binding["reaction"]["service_id"], "spotify");
    assert_eq!(binding["action"]["config"], serde_json::Value::Null);
    assert_eq!(binding["enabled"], true);
    assert_eq!(binding["owner"], "u1");
}

#[test]
fn created_binding_is_listed() {
    let ws = Workspace::empty();
    let id = create(&ws, &format!(r#"{{"playlistId": "{PLAYLIST}"}}"#)).json()["id"]
        .as_str()
        .unwrap()
        .to_string();

    ws.rl()
        .args(&["binding", "list"])
        .passes()
        .stdout_has(&id)
        .stdout_has("Liked to playlist");
}

#[test]
fn text_output_reports_the_id() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Save it",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:save_track",
        ])
        .passes()
        .stdout_has("Created binding ");
}

#[test]
fn invalid_playlist_is_rejected() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Broken",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:add_track_to_playlist",
            "--reaction-config",
            r#"{"playlistId": "not a playlist"}"#,
        ])
        .fails()
        .stderr_has("invalid reaction configuration")
        .stderr_has("invalid Spotify playlist reference");

    ws.rl()
        .args(&["binding", "list"])
        .passes()
        .stdout_has("No bindings");
}

#[test]
fn invalid_fallback_track_is_rejected() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Save it",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:save_track",
            "--reaction-config",
            r#"{"fallbackTrackId": "???"}"#,
        ])
        .fails()
        .stderr_has("invalid fallback Spotify track reference");
}

#[test]
fn unknown_action_is_rejected() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Nope",
            "--action",
            "spotify:nothing",
            "--reaction",
            "spotify:save_track",
        ])
        .fails()
        .stderr_has("unknown action 'spotify:nothing'");
}

#[test]
fn malformed_json_is_rejected() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "Nope",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:save_track",
            "--reaction-config",
            "{playlist",
        ])
        .fails()
        .stderr_has("--reaction-config is not valid JSON");
}

#[test]
fn short_name_is_rejected() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&[
            "binding",
            "create",
            "--user",
            "u1",
            "--name",
            "ab",
            "--action",
            "spotify:new_saved_track",
            "--reaction",
            "spotify:save_track",
        ])
        .fails()
        .stderr_has("name must be between 3 and 255 characters");
}
