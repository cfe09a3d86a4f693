//! Engine pass specs
//!
//! Drive `rl run` against a mock Spotify API: baseline, delivery,
//! failures recorded on the binding, and token refresh persistence.

use crate::prelude::*;
use mockito::{Matcher, Mock, ServerGuard};

fn saved_tracks(server: &mut ServerGuard, token: &str, items: Vec<serde_json::Value>) -> Mock {
    server
        .mock("GET", "/me/tracks")
        .match_query(Matcher::UrlEncoded("limit".into(), "50".into()))
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page(items))
        .create()
}

fn liked_to_playlist(ws: &Workspace, user: &str) -> String {
    ws.create_binding(&[
        "--user",
        user,
        "--name",
        "Liked to playlist",
        "--action",
        "spotify:new_saved_track",
        "--reaction",
        "spotify:add_track_to_playlist",
        "--reaction-config",
        &format!(r#"{{"playlistId": "{PLAYLIST}"}}"#),
    ])
}

fn status(ws: &Workspace, id: &str) -> serde_json::Value {
    ws.rl()
        .args(&["--format", "json", "binding", "status", id])
        .passes()
        .json()
}

fn run(ws: &Workspace) -> serde_json::Value {
    ws.rl().args(&["--format", "json", "run"]).passes().json()
}

#[test]
fn first_pass_records_baseline_then_new_tracks_are_delivered() {
    let mut server = mockito::Server::new();
    let ws = Workspace::empty();
    ws.spotify_at(&server);
    ws.link_spotify("u1");
    let id = liked_to_playlist(&ws, "u1");

    let baseline = saved_tracks(
        &mut server,
        "access-1",
        vec![track_item(TRACK_A, "2026-01-01T00:00:00Z")],
    );
    let add = server
        .mock("POST", format!("/playlists/{PLAYLIST}/tracks").as_str())
        .match_body(Matcher::Json(json!({
            "uris": [format!("spotify:track:{TRACK_B}")]
        })))
        .with_status(201)
        .with_body(r#"{"snapshot_id":"s1"}"#)
        .expect(1)
        .create();

    let report = run(&ws);
    assert_eq!(report["completed"], 1);
    assert_eq!(report["events_delivered"], 0);
    let state = &status(&ws, &id)["state"];
    assert_eq!(state["checkpoint"]["initialized"], true);
    assert!(state["last_run_at"].is_string());
    assert_eq!(state["last_event_at"], serde_json::Value::Null);

    baseline.remove();
    saved_tracks(
        &mut server,
        "access-1",
        vec![
            track_item(TRACK_B, "2026-01-02T00:00:00Z"),
            track_item(TRACK_A, "2026-01-01T00:00:00Z"),
        ],
    );

    let report = run(&ws);
    assert_eq!(report["events_delivered"], 1);
    assert_eq!(report["reaction_failures"], 0);
    let state = &status(&ws, &id)["state"];
    assert!(state["last_event_at"].is_string());
    assert_eq!(state["last_error"], serde_json::Value::Null);

    // Same listing again: nothing new, nothing re-delivered
    let report = run(&ws);
    assert_eq!(report["events_delivered"], 0);
    add.assert();
}

#[test]
fn poll_failure_is_recorded_and_run_still_succeeds() {
    let mut server = mockito::Server::new();
    let ws = Workspace::empty();
    ws.spotify_at(&server);
    ws.link_spotify("u1");
    let id = liked_to_playlist(&ws, "u1");

    server
        .mock("GET", "/me/tracks")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"error":{"status":500,"message":"boom"}}"#)
        .create();

    let report = run(&ws);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["outcomes"][0]["outcome"], "failed");

    let state = &status(&ws, &id)["state"];
    assert!(state["last_error"]
        .as_str()
        .unwrap()
        .starts_with("poll failed"));
    assert_eq!(state["checkpoint"], serde_json::Value::Null);

    ws.rl()
        .args(&["binding", "status", &id])
        .passes()
        .stdout_has("Last error: poll failed");
}

#[test]
fn missing_account_is_recorded() {
    let server = mockito::Server::new();
    let ws = Workspace::empty();
    ws.spotify_at(&server);
    let id = liked_to_playlist(&ws, "u2");

    let out = ws.rl().args(&["run"]).passes();
    out.stdout_has("1 failed");
    out.stdout_has("no linked spotify account for the action service");

    assert_eq!(
        status(&ws, &id)["state"]["last_error"],
        "no linked spotify account for the action service"
    );
}

#[test]
fn expired_token_is_refreshed_and_persisted() {
    let mut server = mockito::Server::new();
    let ws = Workspace::empty();
    ws.spotify_at(&server);
    ws.rl()
        .args(&[
            "account",
            "set",
            "--user",
            "u1",
            "--service",
            "spotify",
            "--access-token",
            "stale",
            "--refresh-token",
            "refresh-1",
            "--expires-in",
            "0",
        ])
        .passes();
    liked_to_playlist(&ws, "u1");

    let token = server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"fresh","token_type":"Bearer","expires_in":3600}"#)
        .expect(1)
        .create();
    let tracks = saved_tracks(&mut server, "fresh", vec![]);

    assert_eq!(run(&ws)["completed"], 1);
    token.assert();
    tracks.assert();

    // The refreshed token is on disk: the next pass uses it without refreshing
    let report = run(&ws);
    assert_eq!(report["completed"], 1);
    token.assert();
}

#[test]
fn run_with_no_bindings_reports_nothing() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["run"])
        .passes()
        .stdout_has("0 bindings: 0 completed");
}
