// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spotify reference normalization
//!
//! Users paste ids, share links (`https://open.spotify.com/track/<id>?si=..`)
//! or URIs (`spotify:track:<id>`). All three reduce to the 22-character
//! base62 id.

use regex::Regex;
use rl_core::ValidationError;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{22}$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static TRACK_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^spotify:track:([a-z0-9]+)$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static PLAYLIST_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^spotify:playlist:([a-z0-9]+)$").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static TRACK_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/track/([a-z0-9]+)").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static PLAYLIST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/playlist/([a-z0-9]+)").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Track,
    Playlist,
}

impl Kind {
    fn uri_pattern(self) -> &'static Regex {
        match self {
            Kind::Track => &TRACK_URI,
            Kind::Playlist => &PLAYLIST_URI,
        }
    }

    fn path_pattern(self) -> &'static Regex {
        match self {
            Kind::Track => &TRACK_PATH,
            Kind::Playlist => &PLAYLIST_PATH,
        }
    }
}

pub fn is_valid_id(value: &str) -> bool {
    ID_PATTERN.is_match(value)
}

fn valid(id: &str) -> Option<String> {
    is_valid_id(id).then(|| id.to_string())
}

fn match_uri(value: &str, kind: Kind) -> Option<String> {
    let captures = kind.uri_pattern().captures(value.trim())?;
    valid(captures.get(1)?.as_str())
}

fn match_url(value: &str, kind: Kind) -> Option<String> {
    let url = url::Url::parse(value).ok()?;
    let captures = kind.path_pattern().captures(url.path())?;
    valid(captures.get(1)?.as_str())
}

// Drops a trailing query string (`?si=...`) from pasted ids
fn sanitize(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed.split('?').next().unwrap_or(trimmed)
}

/// Canonical playlist id from an id, share URL or `spotify:playlist:` URI
pub fn normalize_playlist_id(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    match_uri(trimmed, Kind::Playlist)
        .or_else(|| match_url(trimmed, Kind::Playlist))
        .or_else(|| valid(sanitize(trimmed)))
        .ok_or_else(|| {
            ValidationError::new(format!(
                "invalid Spotify playlist reference '{trimmed}': expected a 22-character id, an open.spotify.com playlist URL or a spotify:playlist: URI"
            ))
        })
}

/// Canonical track id, or `None` when the value is not a track reference
pub fn resolve_track_id(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if let Some(id) = match_uri(trimmed, Kind::Track).or_else(|| match_url(trimmed, Kind::Track)) {
        return Some(id);
    }
    if ALPHANUMERIC.is_match(trimmed) {
        return valid(sanitize(trimmed));
    }
    None
}

/// `spotify:track:<id>` for any valid track reference
pub fn to_track_uri(value: &str) -> Option<String> {
    resolve_track_id(value).map(|id| format!("spotify:track:{id}"))
}

#[cfg(test)]
#[path = "refs_tests.rs"]
mod tests;
