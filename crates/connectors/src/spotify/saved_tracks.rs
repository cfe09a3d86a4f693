// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "New saved track": fires when a track is added to Liked Songs

use super::client::SpotifyClient;
use super::polling::{decode_or_default, timed_tracks, track_payload, TimedTrack};
use super::{Spotify, MIN_POLL_INTERVAL, NEW_SAVED_TRACK, PAGE_SIZE, SERVICE_ID};
use async_trait::async_trait;
use rl_core::definition::parse_config;
use rl_core::{
    ActionDefinition, BindContext, Checkpoint, ConnectorError, DefinitionInfo, Event, Hook,
    HookOutput, PollingCheckpoint, ValidationError,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct SavedTrackConfig {}

pub struct NewSavedTrack {
    info: DefinitionInfo,
    spotify: Spotify,
}

impl NewSavedTrack {
    pub(crate) fn new(spotify: Spotify) -> Self {
        Self {
            info: DefinitionInfo {
                id: NEW_SAVED_TRACK.into(),
                service_id: SERVICE_ID.into(),
                display_name: "New saved track".into(),
                description: "Triggers when a new track is added to the user library (Liked Songs)."
                    .into(),
                fields: Vec::new(),
                min_poll_interval: Some(MIN_POLL_INTERVAL),
            },
            spotify,
        }
    }
}

#[async_trait]
impl ActionDefinition for NewSavedTrack {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        let _: SavedTrackConfig = parse_config(raw)?;
        Ok(json!({}))
    }

    async fn create_hook(
        &self,
        ctx: BindContext,
        _config: &Value,
    ) -> Result<Box<dyn Hook>, ConnectorError> {
        Ok(Box::new(SavedTrackHook {
            client: self.spotify.client(ctx),
            checkpoint: PollingCheckpoint::default(),
        }))
    }
}

struct SavedTrackHook {
    client: SpotifyClient,
    checkpoint: PollingCheckpoint,
}

fn make_event(item: &TimedTrack) -> Event {
    let added_at = item.added_at_text();
    let mut payload = track_payload(item);
    payload.insert("durationMs".into(), json!(item.track.duration_ms));
    Event::new(format!("{}:{}", item.track_id, added_at), item.added_at, payload)
}

#[async_trait]
impl Hook for SavedTrackHook {
    fn load_checkpoint(&mut self, checkpoint: Option<Checkpoint>) -> Result<(), ConnectorError> {
        self.checkpoint = decode_or_default(checkpoint, NEW_SAVED_TRACK);
        Ok(())
    }

    async fn execute(&mut self) -> Result<HookOutput, ConnectorError> {
        let items = timed_tracks(self.client.saved_tracks(PAGE_SIZE).await?);
        let outcome = self.checkpoint.poll(items, TimedTrack::candidate);
        let events: Vec<Event> = outcome.new_items.iter().map(make_event).collect();

        self.checkpoint = outcome.checkpoint;
        let checkpoint =
            Checkpoint::encode(&self.checkpoint).map_err(|e| ConnectorError::Decode(e.to_string()))?;
        Ok(HookOutput { checkpoint, events })
    }
}

#[cfg(test)]
#[path = "saved_tracks_tests.rs"]
mod tests;
