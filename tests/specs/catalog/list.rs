//! Catalog listing specs
//!
//! Verify the built-in definitions are listed and filterable.

use crate::prelude::*;

#[test]
fn lists_actions_by_default() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["catalog"])
        .passes()
        .stdout_has("spotify:new_saved_track")
        .stdout_has("spotify:new_playlist_track")
        .stdout_lacks("spotify:save_track");
}

#[test]
fn lists_reactions_on_request() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["catalog", "--reactions"])
        .passes()
        .stdout_has("spotify:add_track_to_playlist")
        .stdout_has("spotify:save_track")
        .stdout_lacks("spotify:new_saved_track");
}

#[test]
fn json_output_keeps_registration_order_and_metadata() {
    let ws = Workspace::empty();
    let out = ws
        .rl()
        .args(&["--format", "json", "catalog", "--reactions"])
        .passes()
        .json();

    let ids: Vec<&str> = out
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["spotify:add_track_to_playlist", "spotify:save_track"]);
    assert_eq!(out[0]["service_id"], "spotify");
    assert_eq!(out[0]["fields"][0]["name"], "playlistId");
    assert_eq!(out[0]["fields"][0]["required"], true);
}

#[test]
fn actions_advertise_poll_interval() {
    let ws = Workspace::empty();
    let out = ws.rl().args(&["--format", "json", "catalog"]).passes().json();
    assert_eq!(out[0]["min_poll_interval"], 60);
}

#[test]
fn unknown_service_lists_nothing() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["catalog", "--service", "nope"])
        .passes()
        .stdout_has("No actions found");
}

#[test]
fn catalog_does_not_create_the_store() {
    let ws = Workspace::empty();
    ws.rl().args(&["catalog"]).passes();
    assert!(!ws.data_dir().exists());
}
