// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mock Spotify server harness shared by the connector tests

use super::{Spotify, SpotifyConfig};
use chrono::{DateTime, Duration, Utc};
use rl_core::{
    BindContext, Clock, CredentialsListener, ExternalAccount, FakeClock, MemoryStore, Payload,
    UserId,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const TRACK_A: &str = "0VjIjW4GlUZAMYd2vXMi3b";
pub const TRACK_B: &str = "4uLU6hMCjMI75M1A2tKUQC";
pub const TRACK_C: &str = "7qiZfU4dY1lWllzX7mPBI3";
pub const PLAYLIST: &str = "37i9dQZF1DXcBWIGoYBM5M";

/// `Basic base64("client:secret")`
pub const BASIC_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

#[derive(Default)]
pub struct RecordingListener {
    pub updates: Mutex<Vec<ExternalAccount>>,
}

impl CredentialsListener for RecordingListener {
    fn credentials_updated(&self, account: &ExternalAccount) {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(account.clone());
    }
}

pub struct Harness {
    pub server: mockito::ServerGuard,
    pub store: MemoryStore,
    pub clock: FakeClock,
    pub listener: Arc<RecordingListener>,
    pub config: SpotifyConfig,
}

impl Harness {
    pub async fn new() -> Self {
        let server = mockito::Server::new_async().await;
        let config = SpotifyConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            api_base_url: server.url(),
            token_url: format!("{}/api/token", server.url()),
            request_timeout: std::time::Duration::from_secs(5),
        };
        Self {
            server,
            store: MemoryStore::new(),
            clock: FakeClock::new(),
            listener: Arc::new(RecordingListener::default()),
            config,
        }
    }

    pub fn spotify(&self) -> Spotify {
        Spotify::new(&self.config)
    }

    /// For config validation, which never reaches the network
    pub fn spotify_offline() -> Spotify {
        Spotify::new(&SpotifyConfig::default())
    }

    /// Linked account holding `access-1`/`refresh-1`, expiring after `expires_in` seconds
    pub fn account(&self, expires_in: Option<i64>) -> ExternalAccount {
        let mut account = ExternalAccount::new(UserId::new("user-1"), "spotify");
        account.access_token = Some("access-1".into());
        account.refresh_token = Some("refresh-1".into());
        account.token_type = Some("Bearer".into());
        account.expires_at = expires_in.map(|secs| self.clock.now() + Duration::seconds(secs));
        account
    }

    pub fn ctx(&self, account: ExternalAccount) -> BindContext {
        self.store.add_account(account.clone());
        BindContext {
            account,
            accounts: Arc::new(self.store.clone()),
            clock: Arc::new(self.clock.clone()),
            credentials_listener: Some(self.listener.clone()),
        }
    }

    /// Token endpoint answering `fresh-token` for `refresh-1`
    pub async fn token_mock(&mut self, expect: usize) -> mockito::Mock {
        self.server
            .mock("POST", "/api/token")
            .match_header("authorization", BASIC_AUTH)
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "fresh-token",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "scope": "user-library-read playlist-modify-public"
                })
                .to_string(),
            )
            .expect(expect)
            .create_async()
            .await
    }
}

pub fn at(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
}

/// One `/me/tracks` or playlist item
pub fn track_item(id: &str, added_at: &str) -> Value {
    json!({
        "added_at": added_at,
        "track": {
            "id": id,
            "name": format!("Track {id}"),
            "artists": [{ "id": "artist-1", "name": "Artist One" }],
            "album": {
                "id": "album-1",
                "name": "Album One",
                "images": [
                    { "url": "https://i.scdn.co/small", "width": 64 },
                    { "url": "https://i.scdn.co/large", "width": 640 },
                    { "url": "https://i.scdn.co/medium", "width": 300 }
                ]
            },
            "duration_ms": 215000,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
            "preview_url": null
        }
    })
}

pub fn page(items: Vec<Value>) -> String {
    json!({ "items": items }).to_string()
}

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    }
}
