// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers shared by the polling actions

use super::models::{Track, TrackItem};
use chrono::{DateTime, SecondsFormat, Utc};
use rl_core::{Candidate, Checkpoint, Payload};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// A fetched item with a usable id and timestamp
#[derive(Debug, Clone)]
pub(crate) struct TimedTrack {
    pub track_id: String,
    pub added_at: DateTime<Utc>,
    pub track: Track,
}

impl TimedTrack {
    pub fn candidate(&self) -> Candidate {
        Candidate::new(self.track_id.clone(), self.added_at)
    }

    /// `addedAt` as written into payloads and event ids
    pub fn added_at_text(&self) -> String {
        self.added_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Keep items carrying both a track id and a parseable `added_at`
pub(crate) fn timed_tracks(items: Vec<TrackItem>) -> Vec<TimedTrack> {
    items
        .into_iter()
        .filter_map(|item| {
            let track = item.track?;
            let track_id = track.id.clone().filter(|id| !id.is_empty())?;
            let added_at = DateTime::parse_from_rfc3339(item.added_at.as_deref()?)
                .ok()?
                .with_timezone(&Utc);
            Some(TimedTrack {
                track_id,
                added_at,
                track,
            })
        })
        .collect()
}

/// Payload fields common to both actions
pub(crate) fn track_payload(item: &TimedTrack) -> Payload {
    let track = &item.track;
    let album = track.album.as_ref();
    let artists: Vec<Value> = track
        .artists
        .iter()
        .map(|artist| json!({ "id": artist.id, "name": artist.name }))
        .collect();

    let mut payload = Payload::new();
    payload.insert("trackId".into(), json!(item.track_id));
    payload.insert("trackName".into(), json!(track.name));
    payload.insert("artists".into(), Value::Array(artists));
    payload.insert(
        "album".into(),
        json!({
            "id": album.and_then(|a| a.id.clone()),
            "name": album.and_then(|a| a.name.clone()).unwrap_or_else(|| "Unknown album".into()),
            "imageUrl": album.and_then(|a| a.largest_image()),
        }),
    );
    payload.insert(
        "spotifyUrl".into(),
        json!(track.external_urls.as_ref().and_then(|u| u.spotify.clone())),
    );
    payload.insert("previewUrl".into(), json!(track.preview_url));
    payload.insert("addedAt".into(), json!(item.added_at_text()));
    payload
}

/// Decode a stored checkpoint, starting over from a baseline when it is
/// absent or unreadable
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(
    checkpoint: Option<Checkpoint>,
    action_id: &str,
) -> T {
    match checkpoint {
        None => T::default(),
        Some(Checkpoint(Value::Null)) => T::default(),
        Some(stored) => stored.decode().unwrap_or_else(|e| {
            tracing::warn!(action_id, error = %e, "unreadable checkpoint, capturing a new baseline");
            T::default()
        }),
    }
}
