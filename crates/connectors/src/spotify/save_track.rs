// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! "Save track" reaction: adds the event's track to Liked Songs

use super::client::{SpotifyClient, MAX_LIBRARY_SAVE};
use super::refs::resolve_track_id;
use super::track_refs::resolve_track_ids;
use super::{Spotify, SAVE_TRACK, SERVICE_ID};
use async_trait::async_trait;
use rl_core::definition::parse_config;
use rl_core::{
    BindContext, ConfigField, ConnectorError, DefinitionInfo, Handler, Payload,
    ReactionDefinition, ValidationError,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveTrackConfig {
    #[serde(default)]
    fallback_track_id: Option<String>,
}

impl SaveTrackConfig {
    fn fallback(&self) -> Result<Option<String>, ValidationError> {
        match self.fallback_track_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => resolve_track_id(raw).map(Some).ok_or_else(|| {
                ValidationError::new(format!("invalid fallback Spotify track reference '{raw}'"))
            }),
        }
    }
}

pub struct SaveTrack {
    info: DefinitionInfo,
    spotify: Spotify,
}

impl SaveTrack {
    pub(crate) fn new(spotify: Spotify) -> Self {
        Self {
            info: DefinitionInfo {
                id: SAVE_TRACK.into(),
                service_id: SERVICE_ID.into(),
                display_name: "Save track to Liked Songs".into(),
                description: "Saves the Spotify track to the user's library.".into(),
                fields: vec![ConfigField::text("fallbackTrackId", "Fallback track", false)
                    .with_description(
                        "Track saved when the event carries no usable track reference.",
                    )
                    .with_placeholder("0VjIjW4GlUZAMYd2vXMi3b")],
                min_poll_interval: None,
            },
            spotify,
        }
    }
}

#[async_trait]
impl ReactionDefinition for SaveTrack {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        let config: SaveTrackConfig = parse_config(raw)?;
        let mut out = Map::new();
        if let Some(fallback) = config.fallback()? {
            out.insert("fallbackTrackId".into(), json!(fallback));
        }
        Ok(Value::Object(out))
    }

    async fn create_handler(
        &self,
        ctx: BindContext,
        config: &Value,
    ) -> Result<Box<dyn Handler>, ConnectorError> {
        let config: SaveTrackConfig = parse_config(config)?;
        Ok(Box::new(SaveTrackHandler {
            client: self.spotify.client(ctx),
            fallback: config.fallback()?,
        }))
    }
}

struct SaveTrackHandler {
    client: SpotifyClient,
    fallback: Option<String>,
}

#[async_trait]
impl Handler for SaveTrackHandler {
    async fn execute(&self, payload: &Payload) -> Result<(), ConnectorError> {
        let mut ids = resolve_track_ids(payload, self.fallback.as_deref());
        if ids.is_empty() {
            return Err(ConnectorError::Reaction(
                "no valid Spotify track to save to the library".into(),
            ));
        }
        ids.truncate(MAX_LIBRARY_SAVE);
        tracing::debug!(
            track_ids = ?ids,
            has_fallback = self.fallback.is_some(),
            payload_keys = payload.len(),
            "saving tracks"
        );
        self.client.save_tracks(&ids).await
    }
}

#[cfg(test)]
#[path = "save_track_tests.rs"]
mod tests;
