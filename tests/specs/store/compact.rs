//! Store compaction specs

use crate::prelude::*;

#[test]
fn compaction_keeps_current_state() {
    let ws = Workspace::empty();
    let kept = ws.create_binding(&[
        "--user",
        "u1",
        "--name",
        "Keep me",
        "--action",
        "spotify:new_saved_track",
        "--reaction",
        "spotify:save_track",
    ]);
    let dropped = ws.create_binding(&[
        "--user",
        "u1",
        "--name",
        "Drop me",
        "--action",
        "spotify:new_saved_track",
        "--reaction",
        "spotify:save_track",
    ]);
    ws.rl().args(&["binding", "disable", &kept]).passes();
    ws.rl().args(&["binding", "enable", &kept]).passes();
    ws.rl().args(&["binding", "delete", &dropped]).passes();

    ws.rl()
        .args(&["compact"])
        .passes()
        .stdout_has("Compacted ")
        .stdout_has("operations -> ");

    ws.rl()
        .args(&["binding", "list"])
        .passes()
        .stdout_has(&kept)
        .stdout_lacks(&dropped);
}
