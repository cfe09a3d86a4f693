// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by a poll and handed to reactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured event payload
pub type Payload = Map<String, Value>;

/// One genuinely new occurrence found by a poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Connector-defined id, used for logging and idempotency hints
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: Payload,
}

impl Event {
    pub fn new(id: impl Into<String>, occurred_at: DateTime<Utc>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            occurred_at,
            payload,
        }
    }
}
