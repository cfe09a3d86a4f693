// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and environment overrides
//!
//! The file is optional. Lookup order: `--config`, then `RELAY_CONFIG`, then
//! `$XDG_CONFIG_HOME/relay/config.toml` (or `~/.config/relay/config.toml`).
//! An explicitly named file must exist; the default location may be absent.

use anyhow::{Context, Result};
use rl_connectors::spotify::SpotifyConfig;
use rl_connectors::ConnectorsConfig;
use rl_engine::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub storage: StorageSection,
    pub engine: EngineSection,
    pub spotify: SpotifySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub max_concurrency: usize,
    #[serde(with = "humantime_serde")]
    pub poll_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub reaction_timeout: Duration,
    /// Delay between passes for `rl serve`
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for EngineSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            max_concurrency: engine.max_concurrency,
            poll_timeout: engine.poll_timeout,
            reaction_timeout: engine.reaction_timeout,
            interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpotifySection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub token_url: Option<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load from the resolved path and apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    pub(crate) fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env("RELAY_CONFIG").map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::read(&path)?,
            None => match default_path(&env) {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(&env);
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        if let Some(id) = env("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = Some(id);
        }
        if let Some(secret) = env("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = Some(secret);
        }
        if let Some(dir) = env("RELAY_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if self.storage.data_dir.is_none() {
            self.storage.data_dir = default_data_dir(env);
        }
    }

    pub fn data_dir(&self) -> Result<&Path> {
        self.storage
            .data_dir
            .as_deref()
            .context("no data directory: set RELAY_DATA_DIR or [storage] data_dir")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_concurrency: self.engine.max_concurrency,
            poll_timeout: self.engine.poll_timeout,
            reaction_timeout: self.engine.reaction_timeout,
        }
    }

    pub fn connectors_config(&self) -> ConnectorsConfig {
        let defaults = SpotifyConfig::default();
        let section = &self.spotify;
        ConnectorsConfig {
            spotify: SpotifyConfig {
                client_id: section.client_id.clone().unwrap_or_default(),
                client_secret: section.client_secret.clone().unwrap_or_default(),
                api_base_url: section
                    .api_base_url
                    .clone()
                    .unwrap_or(defaults.api_base_url),
                token_url: section.token_url.clone().unwrap_or(defaults.token_url),
                request_timeout: section.request_timeout.unwrap_or(defaults.request_timeout),
            },
        }
    }
}

fn default_path(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("relay/config.toml"));
    }
    env("HOME").map(|home| PathBuf::from(home).join(".config/relay/config.toml"))
}

fn default_data_dir(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = env("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg).join("relay"));
    }
    env("HOME").map(|home| PathBuf::from(home).join(".local/share/relay"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
