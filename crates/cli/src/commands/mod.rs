// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod account;
pub mod binding;
pub mod catalog;
pub mod compact;
pub mod run;

use crate::config::Config;
use anyhow::{Context as _, Result};
use rl_core::{Catalog, SystemClock, UuidIdGen};
use rl_engine::{Engine, EngineDeps, Provisioner};
use rl_storage::WalStore;
use std::sync::Arc;

/// The built catalog, for commands that never touch the store
pub fn build_catalog(config: &Config) -> Result<Arc<Catalog>> {
    let catalog = rl_connectors::default_catalog(&config.connectors_config())?;
    Ok(Arc::new(catalog))
}

/// Store and catalog shared by the stateful commands
pub struct Context {
    pub store: WalStore,
    pub catalog: Arc<Catalog>,
    engine: rl_engine::EngineConfig,
}

impl Context {
    pub fn open(config: &Config) -> Result<Self> {
        let dir = config.data_dir()?;
        let store = WalStore::open(dir)
            .with_context(|| format!("cannot open store in {}", dir.display()))?;
        Ok(Self {
            store,
            catalog: build_catalog(config)?,
            engine: config.engine_config(),
        })
    }

    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(
            Arc::clone(&self.catalog),
            Arc::new(self.store.clone()),
            SystemClock::shared(),
            Arc::new(UuidIdGen),
        )
    }

    pub fn engine(&self) -> Engine {
        Engine::new(
            EngineDeps {
                catalog: Arc::clone(&self.catalog),
                bindings: Arc::new(self.store.clone()),
                accounts: Arc::new(self.store.clone()),
                clock: SystemClock::shared(),
            },
            self.engine.clone(),
        )
    }
}
