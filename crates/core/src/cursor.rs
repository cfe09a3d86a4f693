// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpointed polling cursor
//!
//! External services hand back the newest items of a collection with coarse
//! timestamps and no stable pagination cursor. The cursor remembers the newest
//! timestamp seen by the last successful poll together with every id carrying
//! that timestamp, so items sharing a timestamp can still be told apart.
//!
//! The `ids_at_timestamp` set is bounded by one fetch page. A burst of
//! same-timestamp items larger than the page can be re-emitted once it scrolls
//! into a later, larger fetch; connectors pick a page size well above expected
//! burst sizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item reduced to what the cursor needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }
}

/// Newest timestamp seen and the ids present at it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub timestamp: DateTime<Utc>,
    pub ids_at_timestamp: Vec<String>,
}

impl Cursor {
    /// Compute a fresh cursor from one fetch. `None` when the fetch is empty.
    pub fn resolve(candidates: &[Candidate]) -> Option<Cursor> {
        let newest = candidates.iter().map(|c| c.timestamp).max()?;
        let mut ids_at_timestamp: Vec<String> = Vec::new();
        for candidate in candidates.iter().filter(|c| c.timestamp == newest) {
            if !ids_at_timestamp.contains(&candidate.id) {
                ids_at_timestamp.push(candidate.id.clone());
            }
        }
        Some(Cursor {
            timestamp: newest,
            ids_at_timestamp,
        })
    }

    /// Whether a candidate was not yet seen as of this cursor
    pub fn is_new(&self, candidate: &Candidate) -> bool {
        candidate.timestamp > self.timestamp
            || (candidate.timestamp == self.timestamp
                && !self.ids_at_timestamp.contains(&candidate.id))
    }
}

/// Checkpoint shared by every polling action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingCheckpoint {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

/// Result of applying one fetch to a checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome<T> {
    /// Replacement checkpoint, always initialized
    pub checkpoint: PollingCheckpoint,
    /// New items in ascending timestamp order
    pub new_items: Vec<T>,
}

impl PollingCheckpoint {
    /// Apply one fetch.
    ///
    /// An uninitialized checkpoint captures a baseline and emits nothing.
    /// Otherwise items are selected against the stored cursor. Either way the
    /// returned checkpoint carries the cursor recomputed from this fetch.
    pub fn poll<T, F>(&self, items: Vec<T>, key: F) -> PollOutcome<T>
    where
        F: Fn(&T) -> Candidate,
    {
        let keyed: Vec<(Candidate, T)> = items.into_iter().map(|item| (key(&item), item)).collect();
        let candidates: Vec<Candidate> = keyed.iter().map(|(c, _)| c.clone()).collect();
        let next = PollingCheckpoint {
            initialized: true,
            cursor: Cursor::resolve(&candidates),
        };

        if !self.initialized {
            return PollOutcome {
                checkpoint: next,
                new_items: Vec::new(),
            };
        }

        let mut selected: Vec<(Candidate, T)> = match &self.cursor {
            Some(cursor) => keyed.into_iter().filter(|(c, _)| cursor.is_new(c)).collect(),
            None => keyed,
        };
        // Stable: ties keep fetch order
        selected.sort_by_key(|(c, _)| c.timestamp);

        PollOutcome {
            checkpoint: next,
            new_items: selected.into_iter().map(|(_, item)| item).collect(),
        }
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
