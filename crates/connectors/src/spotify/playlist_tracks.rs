// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "New playlist track": fires when a track is added to a chosen playlist

use super::client::SpotifyClient;
use super::models::PlaylistSummary;
use super::polling::{decode_or_default, timed_tracks, track_payload, TimedTrack};
use super::refs::normalize_playlist_id;
use super::{Spotify, MIN_POLL_INTERVAL, NEW_PLAYLIST_TRACK, PAGE_SIZE, SERVICE_ID};
use async_trait::async_trait;
use rl_core::definition::parse_config;
use rl_core::{
    ActionDefinition, BindContext, Checkpoint, ConfigField, ConnectorError, DefinitionInfo, Event,
    Hook, HookOutput, PollingCheckpoint, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistTrackConfig {
    playlist_id: String,
}

/// Polling checkpoint scoped to the playlist it was taken from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCheckpoint {
    #[serde(flatten)]
    pub polling: PollingCheckpoint,
    #[serde(default)]
    pub playlist_id: String,
}

pub struct NewPlaylistTrack {
    info: DefinitionInfo,
    spotify: Spotify,
}

impl NewPlaylistTrack {
    pub(crate) fn new(spotify: Spotify) -> Self {
        Self {
            info: DefinitionInfo {
                id: NEW_PLAYLIST_TRACK.into(),
                service_id: SERVICE_ID.into(),
                display_name: "New playlist track".into(),
                description: "Triggers when a new track is added to the selected Spotify playlist."
                    .into(),
                fields: vec![ConfigField::text("playlistId", "Playlist", true)
                    .with_description(
                        "Playlist id, open.spotify.com link or spotify:playlist: URI to watch.",
                    )
                    .with_placeholder("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")],
                min_poll_interval: Some(MIN_POLL_INTERVAL),
            },
            spotify,
        }
    }
}

#[async_trait]
impl ActionDefinition for NewPlaylistTrack {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        let config: PlaylistTrackConfig = parse_config(raw)?;
        let playlist_id = normalize_playlist_id(&config.playlist_id)?;
        Ok(json!({ "playlistId": playlist_id }))
    }

    async fn create_hook(
        &self,
        ctx: BindContext,
        config: &Value,
    ) -> Result<Box<dyn Hook>, ConnectorError> {
        let config: PlaylistTrackConfig = parse_config(config)?;
        let playlist_id = normalize_playlist_id(&config.playlist_id)?;
        let client = self.spotify.client(ctx);
        let summary = client.playlist_summary(&playlist_id).await?;
        Ok(Box::new(PlaylistTrackHook {
            client,
            playlist_id,
            summary,
            checkpoint: PlaylistCheckpoint::default(),
        }))
    }
}

struct PlaylistTrackHook {
    client: SpotifyClient,
    playlist_id: String,
    summary: PlaylistSummary,
    checkpoint: PlaylistCheckpoint,
}

impl PlaylistTrackHook {
    fn make_event(&self, item: &TimedTrack) -> Event {
        let summary = &self.summary;
        let added_at = item.added_at_text();
        let mut payload = track_payload(item);
        payload.insert("playlistId".into(), json!(summary.id));
        payload.insert("playlistName".into(), json!(summary.name));
        payload.insert(
            "playlistUrl".into(),
            json!(summary.external_urls.as_ref().and_then(|u| u.spotify.clone())),
        );
        if let Some(owner) = &summary.owner {
            payload.insert(
                "addedBy".into(),
                json!({ "id": owner.id, "displayName": owner.display_name }),
            );
        }
        Event::new(
            format!("{}:{}:{}", summary.id, item.track_id, added_at),
            item.added_at,
            payload,
        )
    }
}

#[async_trait]
impl Hook for PlaylistTrackHook {
    fn load_checkpoint(&mut self, checkpoint: Option<Checkpoint>) -> Result<(), ConnectorError> {
        let stored: PlaylistCheckpoint = decode_or_default(checkpoint, NEW_PLAYLIST_TRACK);
        // A cursor taken on another playlist says nothing about this one
        self.checkpoint = if stored.polling.initialized && stored.playlist_id != self.playlist_id {
            tracing::info!(
                previous = %stored.playlist_id,
                playlist_id = %self.playlist_id,
                "playlist changed, capturing a new baseline"
            );
            PlaylistCheckpoint::default()
        } else {
            stored
        };
        Ok(())
    }

    async fn execute(&mut self) -> Result<HookOutput, ConnectorError> {
        let items = timed_tracks(
            self.client
                .playlist_tracks(&self.playlist_id, PAGE_SIZE)
                .await?,
        );
        let outcome = self.checkpoint.polling.poll(items, TimedTrack::candidate);
        let events: Vec<Event> = outcome
            .new_items
            .iter()
            .map(|item| self.make_event(item))
            .collect();

        self.checkpoint = PlaylistCheckpoint {
            polling: outcome.checkpoint,
            playlist_id: self.playlist_id.clone(),
        };
        let checkpoint =
            Checkpoint::encode(&self.checkpoint).map_err(|e| ConnectorError::Decode(e.to_string()))?;
        Ok(HookOutput { checkpoint, events })
    }
}

#[cfg(test)]
#[path = "playlist_tracks_tests.rs"]
mod tests;
