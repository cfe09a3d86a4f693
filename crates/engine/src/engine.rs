// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-pass orchestration over the enabled bindings

use crate::accounts::AccountCache;
use crate::config::EngineConfig;
use crate::cycle::Shared;
use crate::locks::KeyedLocks;
use crate::report::{BindingOutcome, RunReport};
use rl_core::{AccountStore, AutomationStore, Catalog, SharedClock, StoreError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Engine collaborators
pub struct EngineDeps {
    pub catalog: Arc<Catalog>,
    pub bindings: Arc<dyn AutomationStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub clock: SharedClock,
}

/// Runs every enabled binding once per [`Engine::run_once`] call.
///
/// Bindings run concurrently up to `max_concurrency`. The engine owns no
/// schedule; callers decide when passes happen.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    pub fn new(deps: EngineDeps, config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                catalog: deps.catalog,
                bindings: deps.bindings,
                accounts: deps.accounts,
                clock: deps.clock,
                config,
                binding_locks: KeyedLocks::new(),
                account_locks: KeyedLocks::new(),
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.shared.catalog
    }

    /// One pass over all enabled bindings.
    ///
    /// Only failing to list bindings is an error; per-binding failures end up
    /// in the report and on each binding's run state.
    pub async fn run_once(&self) -> Result<RunReport, StoreError> {
        let start = Instant::now();
        let bindings = self.shared.bindings.enabled_bindings().await?;
        let mut report = RunReport::default();
        if bindings.is_empty() {
            tracing::debug!("no enabled bindings");
            return Ok(report);
        }
        tracing::info!(bindings = bindings.len(), "engine pass starting");

        let cache = Arc::new(AccountCache::new(Arc::clone(&self.shared.accounts)));
        let permits = Arc::new(Semaphore::new(self.shared.config.max_concurrency.max(1)));
        let mut tasks = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let Some(guard) = self.shared.binding_locks.try_acquire(&binding.id) else {
                tracing::info!(binding_id = %binding.id, "previous cycle still running, skipping");
                report.record(binding.id, BindingOutcome::Skipped);
                continue;
            };
            let id = binding.id.clone();
            let shared = Arc::clone(&self.shared);
            let cache = Arc::clone(&cache);
            let permits = Arc::clone(&permits);
            let handle = tokio::spawn(async move {
                let _guard = guard;
                let _permit = permits.acquire_owned().await.ok();
                shared.run_binding(cache, &binding).await
            });
            tasks.push((id, handle));
        }

        for (id, handle) in tasks {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(binding_id = %id, error = %e, "binding task aborted");
                    let message = if e.is_panic() {
                        "binding cycle panicked"
                    } else {
                        "binding cycle was cancelled"
                    };
                    self.shared.persist_failure(&id, message).await;
                    BindingOutcome::Failed {
                        error: message.to_string(),
                    }
                }
            };
            report.record(id, outcome);
        }
        self.shared.binding_locks.prune();
        self.shared.account_locks.prune();

        tracing::info!(
            bindings = report.bindings,
            completed = report.completed,
            failed = report.failed,
            disabled = report.disabled,
            skipped = report.skipped,
            events_delivered = report.events_delivered,
            reaction_failures = report.reaction_failures,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "engine pass finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
