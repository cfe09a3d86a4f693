// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted action and reaction definitions for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::account::ExternalAccount;
use crate::checkpoint::Checkpoint;
use crate::definition::{
    ActionDefinition, BindContext, DefinitionInfo, Handler, Hook, HookOutput, ReactionDefinition,
};
use crate::error::{ConnectorError, ValidationError};
use crate::event::{Event, Payload};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn info(id: &str, service_id: &str) -> DefinitionInfo {
    DefinitionInfo {
        id: id.to_string(),
        service_id: service_id.to_string(),
        display_name: id.to_string(),
        description: format!("fake definition {id}"),
        fields: Vec::new(),
        min_poll_interval: None,
    }
}

fn validate(raw: &Value) -> Result<Value, ValidationError> {
    if raw.get("invalid").and_then(Value::as_bool) == Some(true) {
        return Err(ValidationError::new("rejected by fake definition"));
    }
    Ok(raw.clone())
}

#[derive(Default)]
struct ActionState {
    polls: VecDeque<Result<Vec<Event>, String>>,
    hook_error: Option<String>,
    delay: Option<Duration>,
    loaded: Vec<Option<Checkpoint>>,
    accounts: Vec<ExternalAccount>,
}

/// Action whose polls return scripted events.
///
/// Checkpoints count successful polls (`{"polls": n}`), so tests can tell
/// whether a failed poll advanced anything.
#[derive(Clone)]
pub struct FakeAction {
    info: DefinitionInfo,
    state: Arc<Mutex<ActionState>>,
}

impl FakeAction {
    pub fn new(id: &str, service_id: &str) -> Self {
        Self {
            info: info(id, service_id),
            state: Arc::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ActionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a successful poll; an exhausted script polls empty
    pub fn push_poll(&self, events: Vec<Event>) {
        self.lock().polls.push_back(Ok(events));
    }

    pub fn push_failure(&self, message: &str) {
        self.lock().polls.push_back(Err(message.to_string()));
    }

    pub fn fail_hook_creation(&self, message: &str) {
        self.lock().hook_error = Some(message.to_string());
    }

    /// Sleep inside every poll
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Checkpoints handed to `load_checkpoint`, one per created hook
    pub fn loaded_checkpoints(&self) -> Vec<Option<Checkpoint>> {
        self.lock().loaded.clone()
    }

    /// Accounts hooks were bound to
    pub fn bound_accounts(&self) -> Vec<ExternalAccount> {
        self.lock().accounts.clone()
    }
}

#[async_trait]
impl ActionDefinition for FakeAction {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        validate(raw)
    }

    async fn create_hook(
        &self,
        ctx: BindContext,
        _config: &Value,
    ) -> Result<Box<dyn Hook>, ConnectorError> {
        let mut state = self.lock();
        if let Some(message) = &state.hook_error {
            return Err(ConnectorError::Transport(message.clone()));
        }
        state.accounts.push(ctx.account);
        Ok(Box::new(FakeHook {
            action: self.clone(),
            polls: 0,
        }))
    }
}

struct FakeHook {
    action: FakeAction,
    polls: u64,
}

#[async_trait]
impl Hook for FakeHook {
    fn load_checkpoint(&mut self, checkpoint: Option<Checkpoint>) -> Result<(), ConnectorError> {
        self.polls = checkpoint
            .as_ref()
            .and_then(|c| c.as_value().get("polls"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        self.action.lock().loaded.push(checkpoint);
        Ok(())
    }

    async fn execute(&mut self) -> Result<HookOutput, ConnectorError> {
        let (next, delay) = {
            let mut state = self.action.lock();
            (state.polls.pop_front(), state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let events = match next {
            Some(Ok(events)) => events,
            Some(Err(message)) => return Err(ConnectorError::Transport(message)),
            None => Vec::new(),
        };
        Ok(HookOutput {
            checkpoint: Checkpoint(json!({ "polls": self.polls + 1 })),
            events,
        })
    }
}

#[derive(Default)]
struct ReactionState {
    delivered: Vec<Payload>,
    failing: HashSet<String>,
    handler_error: Option<String>,
    delay: Option<Duration>,
    accounts: Vec<ExternalAccount>,
}

/// Reaction recording every payload it receives.
///
/// Fails for payloads whose `"id"` was registered with [`FakeReaction::fail_for`].
#[derive(Clone)]
pub struct FakeReaction {
    info: DefinitionInfo,
    state: Arc<Mutex<ReactionState>>,
}

impl FakeReaction {
    pub fn new(id: &str, service_id: &str) -> Self {
        Self {
            info: info(id, service_id),
            state: Arc::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReactionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fail_for(&self, payload_id: &str) {
        self.lock().failing.insert(payload_id.to_string());
    }

    pub fn fail_handler_creation(&self, message: &str) {
        self.lock().handler_error = Some(message.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Payloads delivered successfully, in order
    pub fn delivered(&self) -> Vec<Payload> {
        self.lock().delivered.clone()
    }

    pub fn bound_accounts(&self) -> Vec<ExternalAccount> {
        self.lock().accounts.clone()
    }
}

#[async_trait]
impl ReactionDefinition for FakeReaction {
    fn info(&self) -> &DefinitionInfo {
        &self.info
    }

    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError> {
        validate(raw)
    }

    async fn create_handler(
        &self,
        ctx: BindContext,
        _config: &Value,
    ) -> Result<Box<dyn Handler>, ConnectorError> {
        let mut state = self.lock();
        if let Some(message) = &state.handler_error {
            return Err(ConnectorError::Transport(message.clone()));
        }
        state.accounts.push(ctx.account);
        Ok(Box::new(FakeHandler {
            reaction: self.clone(),
        }))
    }
}

struct FakeHandler {
    reaction: FakeReaction,
}

#[async_trait]
impl Handler for FakeHandler {
    async fn execute(&self, payload: &Payload) -> Result<(), ConnectorError> {
        let delay = self.reaction.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let id = payload.get("id").and_then(Value::as_str).unwrap_or_default();
        let mut state = self.reaction.lock();
        if state.failing.contains(id) {
            return Err(ConnectorError::Reaction(format!("reaction failed for {id}")));
        }
        state.delivered.push(payload.clone());
        Ok(())
    }
}

/// Event with `{"id": id}` as payload
pub fn fake_event(id: &str, occurred_at: chrono::DateTime<chrono::Utc>) -> Event {
    let mut payload = Payload::new();
    payload.insert("id".into(), Value::String(id.to_string()));
    Event::new(id, occurred_at, payload)
}
