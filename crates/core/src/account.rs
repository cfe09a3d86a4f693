// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linked external-service accounts

use crate::binding::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth credentials one user has linked for one external service
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAccount {
    pub user_id: UserId,
    pub service_id: String,
    #[serde(default)]
    pub provider_account_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl ExternalAccount {
    pub fn new(user_id: UserId, service_id: impl Into<String>) -> Self {
        Self {
            user_id,
            service_id: service_id.into(),
            provider_account_id: None,
            access_token: None,
            refresh_token: None,
            token_type: None,
            expires_at: None,
            scopes: Vec::new(),
        }
    }
}

// Tokens stay out of logs
impl fmt::Debug for ExternalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalAccount")
            .field("user_id", &self.user_id)
            .field("service_id", &self.service_id)
            .field("provider_account_id", &self.provider_account_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}
