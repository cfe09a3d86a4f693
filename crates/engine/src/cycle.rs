// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One binding's cycle: resolve, poll, react
//!
//! A definition missing from the catalog disables the binding. Every other
//! failure is recorded on the run state and retried next pass. The checkpoint
//! is persisted before any reaction runs, so a crash mid-batch loses events
//! rather than replaying side effects.

use crate::accounts::AccountCache;
use crate::config::EngineConfig;
use crate::error::{CycleError, Role};
use crate::locks::KeyedLocks;
use crate::report::BindingOutcome;
use rl_core::{
    AccountStore, ActionDefinition, AutomationBinding, AutomationStore, BindContext, BindingId,
    Catalog, Checkpoint, Clock, CredentialsListener, Event, ExternalAccount, Handler, HookOutput,
    ReactionDefinition, RunState, SharedClock, StoreError, UserId,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

/// Everything binding cycles share, read-only apart from the locks
pub(crate) struct Shared {
    pub catalog: Arc<Catalog>,
    pub bindings: Arc<dyn AutomationStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub clock: SharedClock,
    pub config: EngineConfig,
    /// Held for a whole cycle; a busy binding is skipped
    pub binding_locks: KeyedLocks<BindingId>,
    /// Serializes token use and refresh per linked account
    pub account_locks: KeyedLocks<(UserId, String)>,
}

type Definitions = (Arc<dyn ActionDefinition>, Arc<dyn ReactionDefinition>);

impl Shared {
    /// Run one cycle, recording any binding-level failure
    pub async fn run_binding(
        &self,
        cache: Arc<AccountCache>,
        binding: &AutomationBinding,
    ) -> BindingOutcome {
        let span = tracing::info_span!(
            "binding.cycle",
            binding_id = %binding.id,
            action_id = %binding.action.definition_id,
            reaction_id = %binding.reaction.definition_id,
        );
        async {
            let start = Instant::now();
            let outcome = match self.cycle(&cache, binding).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let message = err.to_string();
                    self.persist_failure(&binding.id, &message).await;
                    BindingOutcome::Failed { error: message }
                }
            };
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &outcome {
                BindingOutcome::Completed {
                    events,
                    delivered,
                    reaction_failures,
                } => tracing::info!(
                    events,
                    delivered,
                    reaction_failures,
                    elapsed_ms,
                    "cycle completed"
                ),
                BindingOutcome::Failed { error } => {
                    tracing::warn!(error = %error, elapsed_ms, "cycle failed")
                }
                BindingOutcome::Disabled { reason } => {
                    tracing::warn!(reason = %reason, elapsed_ms, "binding disabled")
                }
                BindingOutcome::Skipped => {}
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Record a failure without touching the checkpoint
    pub async fn persist_failure(&self, id: &BindingId, message: &str) {
        if let Err(e) = self.try_persist_failure(id, message).await {
            tracing::error!(binding_id = %id, error = %e, "could not record binding failure");
        }
    }

    async fn try_persist_failure(&self, id: &BindingId, message: &str) -> Result<(), StoreError> {
        let mut state = self.bindings.run_state(id).await?;
        state.record_failure(message, self.clock.now());
        self.bindings.save_run_state(id, state).await
    }

    async fn cycle(
        &self,
        cache: &Arc<AccountCache>,
        binding: &AutomationBinding,
    ) -> Result<BindingOutcome, CycleError> {
        // Resolving
        let (action, reaction) = match self.definitions(binding) {
            Ok(found) => found,
            Err(err) => {
                self.bindings.set_enabled(&binding.id, false).await?;
                return Ok(BindingOutcome::Disabled {
                    reason: err.to_string(),
                });
            }
        };
        let action_service = action.info().service_id.clone();
        let reaction_service = reaction.info().service_id.clone();
        let action_account = self
            .account(cache, &binding.owner, Role::Action, &action_service)
            .await?;
        let reaction_account = self
            .account(cache, &binding.owner, Role::Reaction, &reaction_service)
            .await?;
        let _account_guards = self
            .lock_accounts(&binding.owner, [&action_service, &reaction_service])
            .await;
        // Another cycle may have refreshed the tokens while we waited
        let action_account = cache
            .get(&binding.owner, &action_service)
            .await?
            .unwrap_or(action_account);

        // Polling
        let mut state = self.bindings.run_state(&binding.id).await?;
        let output = self
            .poll(
                cache,
                binding,
                action.as_ref(),
                action_account,
                state.checkpoint.clone(),
            )
            .await?;
        state.checkpoint = Some(output.checkpoint);
        state.last_run_at = Some(self.clock.now());
        state.last_error = None;
        self.bindings
            .save_run_state(&binding.id, state.clone())
            .await?;
        if output.events.is_empty() {
            return Ok(BindingOutcome::Completed {
                events: 0,
                delivered: 0,
                reaction_failures: 0,
            });
        }

        // Reacting, with tokens the poll may have refreshed
        let account = cache
            .get(&binding.owner, &reaction_service)
            .await?
            .unwrap_or(reaction_account);
        let handler = self.handler(cache, binding, reaction.as_ref(), account).await?;
        let outcome = self
            .react(handler.as_ref(), &output.events, &mut state)
            .await;
        self.bindings.save_run_state(&binding.id, state).await?;
        Ok(outcome)
    }

    fn definitions(&self, binding: &AutomationBinding) -> Result<Definitions, CycleError> {
        let action = self
            .catalog
            .action(&binding.action.definition_id)
            .ok_or_else(|| CycleError::UnknownDefinition {
                role: Role::Action,
                id: binding.action.definition_id.clone(),
            })?;
        let reaction = self
            .catalog
            .reaction(&binding.reaction.definition_id)
            .ok_or_else(|| CycleError::UnknownDefinition {
                role: Role::Reaction,
                id: binding.reaction.definition_id.clone(),
            })?;
        Ok((action, reaction))
    }

    async fn account(
        &self,
        cache: &AccountCache,
        owner: &UserId,
        role: Role,
        service_id: &str,
    ) -> Result<ExternalAccount, CycleError> {
        cache
            .get(owner, service_id)
            .await?
            .ok_or_else(|| CycleError::MissingAccount {
                role,
                service_id: service_id.to_string(),
            })
    }

    /// Account locks in a fixed order so concurrent cycles cannot deadlock
    async fn lock_accounts(
        &self,
        owner: &UserId,
        services: [&String; 2],
    ) -> Vec<OwnedMutexGuard<()>> {
        let mut keys: Vec<(UserId, String)> = services
            .iter()
            .map(|service| (owner.clone(), (*service).clone()))
            .collect();
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.account_locks.acquire(key).await);
        }
        guards
    }

    fn bind_context(&self, cache: &Arc<AccountCache>, account: ExternalAccount) -> BindContext {
        BindContext {
            account,
            accounts: Arc::clone(&self.accounts),
            clock: Arc::clone(&self.clock),
            credentials_listener: Some(Arc::clone(cache) as Arc<dyn CredentialsListener>),
        }
    }

    async fn poll(
        &self,
        cache: &Arc<AccountCache>,
        binding: &AutomationBinding,
        action: &dyn ActionDefinition,
        account: ExternalAccount,
        checkpoint: Option<Checkpoint>,
    ) -> Result<HookOutput, CycleError> {
        let ctx = self.bind_context(cache, account);
        let config = binding.action.config_or_empty();
        let poll = async move {
            let mut hook = action
                .create_hook(ctx, &config)
                .await
                .map_err(|source| CycleError::Bind {
                    role: Role::Action,
                    source,
                })?;
            hook.load_checkpoint(checkpoint).map_err(CycleError::Poll)?;
            hook.execute().await.map_err(CycleError::Poll)
        };
        let after = self.config.poll_timeout;
        let output = tokio::time::timeout(after, poll)
            .await
            .map_err(|_| CycleError::Timeout {
                stage: "poll",
                after,
            })??;
        tracing::debug!(events = output.events.len(), "polled");
        Ok(output)
    }

    async fn handler(
        &self,
        cache: &Arc<AccountCache>,
        binding: &AutomationBinding,
        reaction: &dyn ReactionDefinition,
        account: ExternalAccount,
    ) -> Result<Box<dyn Handler>, CycleError> {
        let ctx = self.bind_context(cache, account);
        let config = binding.reaction.config_or_empty();
        let after = self.config.reaction_timeout;
        tokio::time::timeout(after, reaction.create_handler(ctx, &config))
            .await
            .map_err(|_| CycleError::Timeout {
                stage: "reaction setup",
                after,
            })?
            .map_err(|source| CycleError::Bind {
                role: Role::Reaction,
                source,
            })
    }

    /// Run the handler once per event, in order, never stopping early
    async fn react(
        &self,
        handler: &dyn Handler,
        events: &[Event],
        state: &mut RunState,
    ) -> BindingOutcome {
        let mut delivered = 0;
        let mut reaction_failures = 0;
        let after = self.config.reaction_timeout;
        for event in events {
            let result = match tokio::time::timeout(after, handler.execute(&event.payload)).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(CycleError::Timeout {
                    stage: "reaction",
                    after,
                }
                .to_string()),
            };
            match result {
                Ok(()) => {
                    state.last_event_at = Some(event.occurred_at);
                    delivered += 1;
                    tracing::info!(event_id = %event.id, "reaction executed");
                }
                Err(message) => {
                    tracing::error!(event_id = %event.id, error = %message, "reaction failed");
                    state.last_error = Some(message);
                    reaction_failures += 1;
                }
            }
        }
        BindingOutcome::Completed {
            events: events.len(),
            delivered,
            reaction_failures,
        }
    }
}
