// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated Spotify Web API client
//!
//! Every call first makes sure the access token has at least a minute left
//! (refreshing it otherwise). A 401 on the first attempt forces one refresh
//! and one retry; a second 401 is returned to the caller.

use super::models::{Page, PlaylistSummary, TokenResponse, TrackItem};
use super::SpotifyConfig;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Method, StatusCode};
use rl_core::{
    AccountStore, BindContext, ConnectorError, CredentialsListener, ExternalAccount, SharedClock,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::Instrument;

/// Refresh when the token has less than this left
const REFRESH_MARGIN_SECS: i64 = 60;

/// Spotify caps playlist additions per request
pub const MAX_PLAYLIST_ADD: usize = 100;
/// Spotify caps library saves per request
pub const MAX_LIBRARY_SAVE: usize = 50;

const PLAYLIST_TRACK_FIELDS: &str = "items(added_at,track(id,name,artists(id,name),album(id,name,images),duration_ms,external_urls,preview_url))";
const PLAYLIST_SUMMARY_FIELDS: &str = "id,name,external_urls,images,owner(id,display_name)";

fn transport(e: reqwest::Error) -> ConnectorError {
    ConnectorError::Transport(e.to_string())
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Message for a failed call: the service's `error.message` when present
fn api_error(status: StatusCode, body: &str) -> ConnectorError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "Spotify API request failed with status {}",
                status.as_u16()
            )
        });
    ConnectorError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Client bound to one user's linked Spotify account
pub struct SpotifyClient {
    http: reqwest::Client,
    config: Arc<SpotifyConfig>,
    account: Mutex<ExternalAccount>,
    accounts: Arc<dyn AccountStore>,
    clock: SharedClock,
    listener: Option<Arc<dyn CredentialsListener>>,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, config: Arc<SpotifyConfig>, ctx: BindContext) -> Self {
        Self {
            http,
            config,
            account: Mutex::new(ctx.account),
            accounts: ctx.accounts,
            clock: ctx.clock,
            listener: ctx.credentials_listener,
        }
    }

    /// Snapshot of the bound account, including any refreshed tokens
    pub async fn account(&self) -> ExternalAccount {
        self.account.lock().await.clone()
    }

    /// Most recently saved tracks, newest first
    pub async fn saved_tracks(&self, limit: u32) -> Result<Vec<TrackItem>, ConnectorError> {
        let page: Page<TrackItem> = self
            .get_json("/me/tracks", &[("limit", limit.to_string())])
            .await?;
        Ok(page.items)
    }

    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<TrackItem>, ConnectorError> {
        let path = format!("/playlists/{}/tracks", encode_segment(playlist_id));
        let page: Page<TrackItem> = self
            .get_json(
                &path,
                &[
                    ("limit", limit.to_string()),
                    ("fields", PLAYLIST_TRACK_FIELDS.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    pub async fn playlist_summary(
        &self,
        playlist_id: &str,
    ) -> Result<PlaylistSummary, ConnectorError> {
        let path = format!("/playlists/{}", encode_segment(playlist_id));
        self.get_json(&path, &[("fields", PLAYLIST_SUMMARY_FIELDS.to_string())])
            .await
    }

    /// Append tracks to a playlist. Empty input is a no-op.
    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ConnectorError> {
        let uris: Vec<&String> = uris.iter().filter(|u| !u.is_empty()).collect();
        if uris.is_empty() {
            return Ok(());
        }
        let take = uris.len().min(MAX_PLAYLIST_ADD);
        let body = json!({ "uris": &uris[..take] });
        let path = format!("/playlists/{}/tracks", encode_segment(playlist_id));
        self.send(Method::POST, &path, &[], Some(&body)).await?;
        Ok(())
    }

    /// Save tracks to the user's library. Empty input is a no-op.
    pub async fn save_tracks(&self, ids: &[String]) -> Result<(), ConnectorError> {
        let ids: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .take(MAX_LIBRARY_SAVE)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        // PUT /me/tracks answers with an empty body
        self.send(Method::PUT, "/me/tracks", &[("ids", ids.join(","))], None)
            .await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ConnectorError> {
        let body = self.send(Method::GET, path, query, None).await?;
        serde_json::from_str(&body).map_err(|e| ConnectorError::Decode(e.to_string()))
    }

    /// Perform one call with proactive and reactive refresh; returns the body
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String, ConnectorError> {
        let span = tracing::info_span!("spotify.request", method = %method, path);
        async {
            let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
            let start = Instant::now();
            let mut attempt = 0;
            loop {
                let token = if attempt == 0 {
                    self.access_token().await?
                } else {
                    self.force_refresh().await?
                };

                let mut request = self
                    .http
                    .request(method.clone(), &url)
                    .timeout(self.config.request_timeout)
                    .bearer_auth(token)
                    .query(query);
                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = request.send().await.map_err(transport)?;
                let status = response.status();

                if status == StatusCode::UNAUTHORIZED && attempt == 0 {
                    tracing::debug!("unauthorized, refreshing token and retrying");
                    attempt += 1;
                    continue;
                }

                let text = response.text().await.map_err(transport)?;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if !status.is_success() {
                    let err = api_error(status, &text);
                    tracing::warn!(status = status.as_u16(), elapsed_ms, error = %err, "request failed");
                    return Err(err);
                }
                tracing::debug!(status = status.as_u16(), elapsed_ms, "request completed");
                return Ok(text);
            }
        }
        .instrument(span)
        .await
    }

    /// Current access token, refreshed first when missing or about to expire
    async fn access_token(&self) -> Result<String, ConnectorError> {
        let mut account = self.account.lock().await;
        let Some(token) = account.access_token.clone() else {
            return self.refresh_locked(&mut account).await;
        };
        match account.expires_at {
            Some(expires_at)
                if expires_at - self.clock.now() < Duration::seconds(REFRESH_MARGIN_SECS) =>
            {
                self.refresh_locked(&mut account).await
            }
            _ => Ok(token),
        }
    }

    async fn force_refresh(&self) -> Result<String, ConnectorError> {
        let mut account = self.account.lock().await;
        self.refresh_locked(&mut account).await
    }

    /// Refresh-token grant. The account is saved before the new token is used.
    async fn refresh_locked(&self, account: &mut ExternalAccount) -> Result<String, ConnectorError> {
        let refresh_token = account.refresh_token.clone().ok_or_else(|| {
            ConnectorError::Credentials("cannot refresh Spotify token without refresh token".into())
        })?;

        let response = self
            .http
            .post(&self.config.token_url)
            .timeout(self.config.request_timeout)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), user_id = %account.user_id, "token refresh failed");
            return Err(ConnectorError::Api {
                status: status.as_u16(),
                message: "failed to refresh Spotify access token".into(),
            });
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| ConnectorError::Decode(e.to_string()))?;
        let expires_at = token_expiry(self.clock.now(), tokens.expires_in)?;

        account.access_token = Some(tokens.access_token.clone());
        if let Some(rotated) = tokens.refresh_token {
            account.refresh_token = Some(rotated);
        }
        if let Some(token_type) = tokens.token_type {
            account.token_type = Some(token_type);
        }
        if let Some(scope) = tokens.scope {
            account.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
        account.expires_at = Some(expires_at);

        self.accounts.save_account(account.clone()).await?;
        if let Some(listener) = &self.listener {
            listener.credentials_updated(account);
        }
        tracing::info!(
            user_id = %account.user_id,
            service_id = %account.service_id,
            expires_in = tokens.expires_in,
            "refreshed access token"
        );

        Ok(tokens.access_token)
    }
}

/// Expiry for a token issued at `now`. `expires_in` is clamped to
/// `0..=i32::MAX` seconds.
fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, ConnectorError> {
    Duration::try_seconds(expires_in.clamp(0, i64::from(i32::MAX)))
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| ConnectorError::Decode(format!("token expiry out of range: {expires_in}s")))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
