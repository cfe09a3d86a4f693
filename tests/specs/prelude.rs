//! Shared helpers for the CLI specs

use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;

pub use serde_json::json;

pub const TRACK_A: &str = "0VjIjW4GlUZAMYd2vXMi3b";
pub const TRACK_B: &str = "4uLU6hMCjMI75M1A2tKUQC";
pub const PLAYLIST: &str = "37i9dQZF1DXcBWIGoYBM5M";

/// Path to the `rl` binary under test.
///
/// `RL_BINARY` overrides; otherwise the binary cargo put next to this test
/// executable's `deps/` directory (the root package does not own `rl`, so
/// `CARGO_BIN_EXE_rl` is only set when running from inside rl-cli).
pub fn rl_binary() -> &'static PathBuf {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| {
        if let Some(path) = std::env::var_os("RL_BINARY") {
            return PathBuf::from(path);
        }
        if let Some(path) = option_env!("CARGO_BIN_EXE_rl") {
            return PathBuf::from(path);
        }
        let exe = std::env::current_exe().unwrap();
        let profile_dir = exe
            .parent()
            .and_then(|deps| deps.parent())
            .unwrap()
            .to_path_buf();
        let path = profile_dir.join(format!("rl{}", std::env::consts::EXE_SUFFIX));
        assert!(
            path.exists(),
            "rl binary not found at {}; build it with `cargo build -p rl-cli` or set RL_BINARY",
            path.display()
        );
        path
    })
}

/// An isolated home, data directory and optional config file
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("relay.toml")
    }

    /// Write the config file picked up through `RELAY_CONFIG`
    pub fn config(&self, toml: &str) {
        std::fs::write(self.config_path(), toml).unwrap();
    }

    /// Config pointing the Spotify connector at a mock server
    pub fn spotify_at(&self, server: &mockito::ServerGuard) {
        self.config(&format!(
            r#"
[engine]
poll_timeout = "5s"
reaction_timeout = "5s"

[spotify]
client_id = "client"
client_secret = "secret"
api_base_url = "{url}"
token_url = "{url}/api/token"
request_timeout = "5s"
"#,
            url = server.url()
        ));
    }

    pub fn rl(&self) -> Cli {
        let mut cmd = Command::new(rl_binary());
        cmd.env("HOME", self.dir.path())
            .env("RELAY_DATA_DIR", self.data_dir())
            .env_remove("RELAY_CONFIG")
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .env_remove("SPOTIFY_CLIENT_ID")
            .env_remove("SPOTIFY_CLIENT_SECRET")
            .env_remove("RUST_LOG");
        if self.config_path().exists() {
            cmd.env("RELAY_CONFIG", self.config_path());
        }
        Cli { cmd }
    }

    /// Link a Spotify account for `user` with a token valid for an hour
    pub fn link_spotify(&self, user: &str) {
        self.rl()
            .args(&[
                "account",
                "set",
                "--user",
                user,
                "--service",
                "spotify",
                "--access-token",
                "access-1",
                "--refresh-token",
                "refresh-1",
                "--expires-in",
                "3600",
            ])
            .passes();
    }

    /// Create a binding and return its id
    pub fn create_binding(&self, args: &[&str]) -> String {
        let mut full = vec!["--format", "json", "binding", "create"];
        full.extend_from_slice(args);
        let out = self.rl().args(&full).passes().json();
        out["id"].as_str().unwrap().to_string()
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output.clone());
        assert!(
            output.status.success(),
            "expected success\nstdout:\n{}\nstderr:\n{}",
            out.stdout,
            out.stderr
        );
        out
    }

    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output.clone());
        assert!(
            !output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            out.stdout,
            out.stderr
        );
        out
    }
}

pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn stdout_has(&self, needle: &str) -> &Self {
        assert!(
            self.stdout.contains(needle),
            "stdout does not contain {needle:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(&self, needle: &str) -> &Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly contains {needle:?}:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(&self, needle: &str) -> &Self {
        assert!(
            self.stderr.contains(needle),
            "stderr does not contain {needle:?}:\n{}",
            self.stderr
        );
        self
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// One `/me/tracks` or playlist item
pub fn track_item(id: &str, added_at: &str) -> Value {
    json!({
        "added_at": added_at,
        "track": {
            "id": id,
            "name": format!("Track {id}"),
            "artists": [{ "id": "artist-1", "name": "Artist One" }],
            "album": { "id": "album-1", "name": "Album One", "images": [] },
            "duration_ms": 180000,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
            "preview_url": null
        }
    })
}

pub fn page(items: Vec<Value>) -> String {
    json!({ "items": items }).to_string()
}
