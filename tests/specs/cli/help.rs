//! CLI help specs
//!
//! Verify top-level usage and unknown-command handling.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let ws = Workspace::empty();
    let out = ws.rl().args(&["--help"]).passes();
    for command in ["catalog", "account", "binding", "run", "serve", "compact"] {
        out.stdout_has(command);
    }
}

#[test]
fn binding_help_lists_subcommands() {
    let ws = Workspace::empty();
    let out = ws.rl().args(&["binding", "--help"]).passes();
    for command in ["create", "list", "enable", "disable", "delete", "status"] {
        out.stdout_has(command);
    }
}

#[test]
fn unknown_command_fails() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn serve_rejects_bad_interval() {
    let ws = Workspace::empty();
    ws.rl()
        .args(&["serve", "--interval", "soon"])
        .fails()
        .stderr_has("--interval");
}
