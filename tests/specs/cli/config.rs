//! Configuration specs
//!
//! Verify config file discovery and rejection of bad files.

use crate::prelude::*;

#[test]
fn missing_named_config_fails() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["--config", "/nonexistent/relay.toml", "catalog"])
        .fails()
        .stderr_has("cannot read config file");
}

#[test]
fn invalid_config_fails() {
    let ws = Workspace::empty();
    ws.config("[engine]\nmax_concurrency = \"lots\"\n");
    ws.rl()
        .args(&["catalog"])
        .fails()
        .stderr_has("invalid config file");
}

#[test]
fn unknown_section_fails() {
    let ws = Workspace::empty();
    ws.config("[database]\nurl = \"postgres://\"\n");
    ws.rl().args(&["catalog"]).fails().stderr_has("database");
}

#[test]
fn empty_config_uses_defaults() {
    let ws = Workspace::empty();
    ws.config("");
    ws.rl()
        .args(&["catalog"])
        .passes()
        .stdout_has("spotify:new_saved_track");
}
