// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automation bindings and their run state

use crate::checkpoint::Checkpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Unique identifier for an automation binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub String);

impl BindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BindingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the user owning bindings and external accounts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One side of a binding: a definition id, its service, and validated config.
///
/// An empty config is stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub definition_id: String,
    pub service_id: String,
    #[serde(default)]
    pub config: Option<Value>,
}

impl Endpoint {
    /// The config handed to the definition (`{}` when none was stored)
    pub fn config_or_empty(&self) -> Value {
        self.config
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

/// A user-created pairing of one configured action with one configured reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationBinding {
    pub id: BindingId,
    pub owner: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub enabled: bool,
    pub action: Endpoint,
    pub reaction: Endpoint,
    pub created_at: DateTime<Utc>,
}

/// Per-binding run metadata, mutated only by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub checkpoint: Option<Checkpoint>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_event_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl RunState {
    /// Record a binding-level failure without touching the checkpoint
    pub fn record_failure(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.last_run_at = Some(at);
        self.last_error = Some(message.into());
    }
}
