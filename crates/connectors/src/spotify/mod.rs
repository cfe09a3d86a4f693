// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spotify connector: two polling actions and two reactions

mod add_to_playlist;
mod client;
mod models;
mod playlist_tracks;
mod polling;
mod saved_tracks;
mod save_track;
mod track_refs;

pub mod refs;

pub use add_to_playlist::AddTrackToPlaylist;
pub use client::{SpotifyClient, MAX_LIBRARY_SAVE, MAX_PLAYLIST_ADD};
pub use playlist_tracks::{NewPlaylistTrack, PlaylistCheckpoint};
pub use save_track::SaveTrack;
pub use saved_tracks::NewSavedTrack;
pub use track_refs::{resolve_track_ids, resolve_track_uris};

use rl_core::{
    ActionDefinition, BindContext, Catalog, CatalogError, ReactionDefinition,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const SERVICE_ID: &str = "spotify";

pub const NEW_SAVED_TRACK: &str = "spotify:new_saved_track";
pub const NEW_PLAYLIST_TRACK: &str = "spotify:new_playlist_track";
pub const ADD_TRACK_TO_PLAYLIST: &str = "spotify:add_track_to_playlist";
pub const SAVE_TRACK: &str = "spotify:save_track";

/// Both actions poll at most once a minute
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Items fetched per poll. Also bounds the same-timestamp dedup set.
pub const PAGE_SIZE: u32 = 50;

/// Client credentials and endpoints
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base_url: String,
    pub token_url: String,
    pub request_timeout: Duration,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base_url: "https://api.spotify.com/v1".into(),
            token_url: "https://accounts.spotify.com/api/token".into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// HTTP client and settings shared by every Spotify definition
#[derive(Clone)]
pub(crate) struct Spotify {
    http: reqwest::Client,
    config: Arc<SpotifyConfig>,
}

impl Spotify {
    pub(crate) fn new(config: &SpotifyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config.clone()),
        }
    }

    pub(crate) fn client(&self, ctx: BindContext) -> SpotifyClient {
        SpotifyClient::new(self.http.clone(), Arc::clone(&self.config), ctx)
    }
}

/// Register every Spotify definition
pub fn register(catalog: &mut Catalog, config: &SpotifyConfig) -> Result<(), CatalogError> {
    let spotify = Spotify::new(config);
    let actions: Vec<Arc<dyn ActionDefinition>> = vec![
        Arc::new(NewSavedTrack::new(spotify.clone())),
        Arc::new(NewPlaylistTrack::new(spotify.clone())),
    ];
    let reactions: Vec<Arc<dyn ReactionDefinition>> = vec![
        Arc::new(AddTrackToPlaylist::new(spotify.clone())),
        Arc::new(SaveTrack::new(spotify)),
    ];
    catalog.actions.register_many(actions)?;
    catalog.reactions.register_many(reactions)
}

#[cfg(test)]
pub(crate) mod test_support;
