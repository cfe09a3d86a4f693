// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine tuning

use std::time::Duration;

/// Concurrency and timeout settings for engine passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bindings processed at the same time
    pub max_concurrency: usize,
    /// Bound on hook creation plus one poll
    pub poll_timeout: Duration,
    /// Bound on each reaction call
    pub reaction_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            poll_timeout: Duration::from_secs(30),
            reaction_timeout: Duration::from_secs(30),
        }
    }
}
