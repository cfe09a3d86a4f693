// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "Add track to playlist" reaction

use super::client::SpotifyClient;
use super::refs::{normalize_playlist_id, to_track_uri};
use super::track_refs::resolve_track_uris;
use super::{Spotify, ADD_TRACK_TO_PLAYLIST, SERVICE_ID};
use async_trait::async_trait;
use rl_core::definition::parse_config;
use rl_core::{
    BindContext, ConfigField, ConnectorError, DefinitionInfo, Handler, Payload,
    ReactionDefinition, ValidationError,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// URIs sent per event
const MAX_TRACKS_PER_EVENT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToPlaylistConfig {
    playlist_id: String,
    #[serde(default)]
    fallback_track_uri: Option<String>,
}

impl AddToPlaylistConfig {
    /// Normalized playlist id and fallback URI
    fn normalize(self) -> Result<(String, Option<String>), ValidationError> {
        let playlist_id = normalize_playlist_id(&self.playlist_id)?;
        let fallback = match self.fallback_track_uri.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(to_track_uri(raw).ok_or_else(|| {
                ValidationError::new(format!("invalid fallback Spotify track reference '{raw}'"))
            })?),
        };
        Ok((playlist_id, fallback))
    }
}

pub struct AddTrackToPlaylist {
    info: DefinitionInfo,
    spotify: Spotify,
}

impl AddTrackToPlaylist {
    pub(crate) fn new(spotify: Spotify) -> Self {
        Self {
            info: DefinitionInfo {
                id: ADD_TRACK_TO_PLAYLIST.into(),
                service_id: SERVICE_ID.into(),
                display_name: "Add track to playlist".into(),
                description: "Adds one or more Spotify tracks to the selected playlist.".into(),
                fields: vec![
                    ConfigField::text("playlistId", "Target playlist", true)
                        .with_description(
                            "Playlist id, open.spotify.com link or spotify:playlist: URI.",
                        )
                        .with_placeholder(
                            "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M",
                        ),
                    ConfigField::text("fallbackTrackUri", "Fallback track", false)
                        .with_description(
                            "Track added when the event carries no usable track reference.",
                        )
                        .with_placeholder("spotify:track:0VjIjW4GlUZAMYd2vXMi3b"),
                ],
                min_poll_interval: None,
            },
            spotify,
        }
    }
}

#[async_trait]
impl ReactionDefinition for AddTrackToPlaylist {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        let config: AddToPlaylistConfig = parse_config(raw)?;
        let (playlist_id, fallback) = config.normalize()?;
        let mut out = Map::new();
        out.insert("playlistId".into(), json!(playlist_id));
        if let Some(fallback) = fallback {
            out.insert("fallbackTrackUri".into(), json!(fallback));
        }
        Ok(Value::Object(out))
    }

    async fn create_handler(
        &self,
        ctx: BindContext,
        config: &Value,
    ) -> Result<Box<dyn Handler>, ConnectorError> {
        let config: AddToPlaylistConfig = parse_config(config)?;
        let (playlist_id, fallback) = config.normalize()?;
        Ok(Box::new(AddToPlaylistHandler {
            client: self.spotify.client(ctx),
            playlist_id,
            fallback,
        }))
    }
}

struct AddToPlaylistHandler {
    client: SpotifyClient,
    playlist_id: String,
    fallback: Option<String>,
}

#[async_trait]
impl Handler for AddToPlaylistHandler {
    async fn execute(&self, payload: &Payload) -> Result<(), ConnectorError> {
        let mut uris = resolve_track_uris(payload, self.fallback.as_deref());
        if uris.is_empty() {
            return Err(ConnectorError::Reaction(
                "no valid Spotify track to add to the playlist".into(),
            ));
        }
        uris.truncate(MAX_TRACKS_PER_EVENT);
        tracing::debug!(playlist_id = %self.playlist_id, tracks = uris.len(), "adding to playlist");
        self.client
            .add_tracks_to_playlist(&self.playlist_id, &uris)
            .await
    }
}

#[cfg(test)]
#[path = "add_to_playlist_tests.rs"]
mod tests;
