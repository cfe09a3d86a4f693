// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Track extraction from event payloads
//!
//! Payload shapes depend on whichever action produced the event, so the
//! reactions check a fixed, ordered list of likely fields and keep every
//! token that resolves to a valid track reference.

use super::refs::{resolve_track_id, to_track_uri};
use rl_core::Payload;
use serde_json::Value;

const URI_ARRAY_KEYS: [&str; 3] = ["trackUris", "uris", "tracks"];
const URI_KEYS: [&str; 3] = ["trackUri", "uri", "spotifyUri"];
const ID_ARRAY_KEYS: [&str; 2] = ["trackIds", "ids"];
const ID_KEYS: [&str; 3] = ["trackId", "id", "spotifyId"];

/// Strings held by a field: a string, or the strings of an array
fn strings(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// The trimmed value plus its parts split on `:`, `/` and spaces
fn expand(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut tokens = vec![trimmed.to_string()];
    for separator in [':', '/', ' '] {
        if trimmed.contains(separator) {
            for part in trimmed.split(separator).map(str::trim) {
                if !part.is_empty() && !tokens.iter().any(|t| t == part) {
                    tokens.push(part.to_string());
                }
            }
        }
    }
    tokens
}

/// Collects resolved references in first-seen order without duplicates
struct Collector<F> {
    resolve: F,
    found: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Collector<F> {
    fn new(resolve: F) -> Self {
        Self {
            resolve,
            found: Vec::new(),
        }
    }

    fn gather(&mut self, value: Option<&Value>) {
        for raw in strings(value) {
            for token in expand(raw) {
                if let Some(resolved) = (self.resolve)(&token) {
                    if !self.found.contains(&resolved) {
                        self.found.push(resolved);
                    }
                }
            }
        }
    }
}

fn nested_track(payload: &Payload) -> Option<&serde_json::Map<String, Value>> {
    payload.get("track").and_then(Value::as_object)
}

/// `spotify:track:<id>` URIs found in the payload, then in the fallback
pub fn resolve_track_uris(payload: &Payload, fallback: Option<&str>) -> Vec<String> {
    let mut uris = Collector::new(to_track_uri);
    for key in URI_ARRAY_KEYS.iter().chain(&URI_KEYS) {
        uris.gather(payload.get(*key));
    }
    for key in ID_ARRAY_KEYS.iter().chain(&ID_KEYS) {
        uris.gather(payload.get(*key));
    }
    if let Some(track) = nested_track(payload) {
        uris.gather(track.get("uri"));
        uris.gather(track.get("id"));
    }
    if let Some(fallback) = fallback {
        uris.gather(Some(&Value::String(fallback.to_string())));
    }
    uris.found
}

/// Track ids found in the payload, then in the fallback.
///
/// When no id-shaped field yields anything, URI-shaped fields are tried.
pub fn resolve_track_ids(payload: &Payload, fallback: Option<&str>) -> Vec<String> {
    let mut ids = Collector::new(resolve_track_id);
    for key in ID_ARRAY_KEYS.iter().chain(&ID_KEYS) {
        ids.gather(payload.get(*key));
    }
    if let Some(track) = nested_track(payload) {
        ids.gather(track.get("id"));
        ids.gather(track.get("uri"));
    }
    if let Some(fallback) = fallback {
        ids.gather(Some(&Value::String(fallback.to_string())));
    }
    if !ids.found.is_empty() {
        return ids.found;
    }

    let mut from_uris = Collector::new(resolve_track_id);
    for uri in resolve_track_uris(payload, fallback) {
        from_uris.gather(Some(&Value::String(uri)));
    }
    from_uris.found
}

#[cfg(test)]
#[path = "track_refs_tests.rs"]
mod tests;
