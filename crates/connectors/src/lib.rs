// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rl-connectors: concrete action/reaction implementations
//!
//! [`default_catalog`] is the one-time construction step that registers every
//! built-in definition.

pub mod spotify;

use rl_core::{Catalog, CatalogError};
use spotify::SpotifyConfig;

/// Settings for every built-in connector
#[derive(Debug, Clone, Default)]
pub struct ConnectorsConfig {
    pub spotify: SpotifyConfig,
}

/// Build the catalog of built-in definitions
pub fn default_catalog(config: &ConnectorsConfig) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    spotify::register(&mut catalog, &config.spotify)?;
    tracing::debug!(
        actions = catalog.actions.len(),
        reactions = catalog.reactions.len(),
        "catalog built"
    );
    Ok(catalog)
}
