// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence collaborator interfaces

use crate::account::ExternalAccount;
use crate::binding::{AutomationBinding, BindingId, RunState, UserId};
use crate::error::StoreError;
use async_trait::async_trait;

/// Bindings and their run state
#[async_trait]
pub trait AutomationStore: Send + Sync {
    /// Every enabled binding, with its owner
    async fn enabled_bindings(&self) -> Result<Vec<AutomationBinding>, StoreError>;

    async fn list_bindings(&self, owner: Option<&UserId>)
        -> Result<Vec<AutomationBinding>, StoreError>;

    async fn binding(&self, id: &BindingId) -> Result<Option<AutomationBinding>, StoreError>;

    async fn insert_binding(&self, binding: AutomationBinding) -> Result<(), StoreError>;

    async fn set_enabled(&self, id: &BindingId, enabled: bool) -> Result<(), StoreError>;

    /// Removes the binding and its run state
    async fn delete_binding(&self, id: &BindingId) -> Result<(), StoreError>;

    /// Get-or-create: a missing run state is created empty and persisted
    async fn run_state(&self, id: &BindingId) -> Result<RunState, StoreError>;

    async fn save_run_state(&self, id: &BindingId, state: RunState) -> Result<(), StoreError>;
}

/// Linked external accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(
        &self,
        user: &UserId,
        service_id: &str,
    ) -> Result<Option<ExternalAccount>, StoreError>;

    /// Durable once this returns
    async fn save_account(&self, account: ExternalAccount) -> Result<(), StoreError>;
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MemoryState {
        bindings: Vec<AutomationBinding>,
        run_states: HashMap<BindingId, RunState>,
        accounts: Vec<ExternalAccount>,
        run_state_saves: Vec<(BindingId, RunState)>,
        account_saves: Vec<ExternalAccount>,
        failing_saves: HashSet<BindingId>,
        fail_listing: bool,
    }

    /// In-memory store with call recording and failure injection
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        state: Arc<Mutex<MemoryState>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Seed an account without recording a save
        pub fn add_account(&self, account: ExternalAccount) {
            let mut state = self.lock();
            state
                .accounts
                .retain(|a| !(a.user_id == account.user_id && a.service_id == account.service_id));
            state.accounts.push(account);
        }

        pub fn account(&self, user: &UserId, service_id: &str) -> Option<ExternalAccount> {
            self.lock()
                .accounts
                .iter()
                .find(|a| &a.user_id == user && a.service_id == service_id)
                .cloned()
        }

        /// Peek at stored run state without creating it
        pub fn stored_run_state(&self, id: &BindingId) -> Option<RunState> {
            self.lock().run_states.get(id).cloned()
        }

        /// Run states passed to `save_run_state` for one binding, in order
        pub fn run_state_saves(&self, id: &BindingId) -> Vec<RunState> {
            self.lock()
                .run_state_saves
                .iter()
                .filter(|(b, _)| b == id)
                .map(|(_, s)| s.clone())
                .collect()
        }

        pub fn account_saves(&self) -> Vec<ExternalAccount> {
            self.lock().account_saves.clone()
        }

        /// Make `save_run_state` fail for one binding
        pub fn fail_saves_for(&self, id: &BindingId) {
            self.lock().failing_saves.insert(id.clone());
        }

        /// Make `enabled_bindings` fail
        pub fn fail_listing(&self) {
            self.lock().fail_listing = true;
        }
    }

    #[async_trait]
    impl AutomationStore for MemoryStore {
        async fn enabled_bindings(&self) -> Result<Vec<AutomationBinding>, StoreError> {
            let state = self.lock();
            if state.fail_listing {
                return Err(StoreError::Backend("listing failed".into()));
            }
            Ok(state.bindings.iter().filter(|b| b.enabled).cloned().collect())
        }

        async fn list_bindings(
            &self,
            owner: Option<&UserId>,
        ) -> Result<Vec<AutomationBinding>, StoreError> {
            Ok(self
                .lock()
                .bindings
                .iter()
                .filter(|b| owner.is_none_or(|o| &b.owner == o))
                .cloned()
                .collect())
        }

        async fn binding(&self, id: &BindingId) -> Result<Option<AutomationBinding>, StoreError> {
            Ok(self.lock().bindings.iter().find(|b| &b.id == id).cloned())
        }

        async fn insert_binding(&self, binding: AutomationBinding) -> Result<(), StoreError> {
            let mut state = self.lock();
            if state.bindings.iter().any(|b| b.id == binding.id) {
                return Err(StoreError::BindingExists(binding.id.to_string()));
            }
            state.bindings.push(binding);
            Ok(())
        }

        async fn set_enabled(&self, id: &BindingId, enabled: bool) -> Result<(), StoreError> {
            let mut state = self.lock();
            let binding = state
                .bindings
                .iter_mut()
                .find(|b| &b.id == id)
                .ok_or_else(|| StoreError::BindingNotFound(id.to_string()))?;
            binding.enabled = enabled;
            Ok(())
        }

        async fn delete_binding(&self, id: &BindingId) -> Result<(), StoreError> {
            let mut state = self.lock();
            let before = state.bindings.len();
            state.bindings.retain(|b| &b.id != id);
            if state.bindings.len() == before {
                return Err(StoreError::BindingNotFound(id.to_string()));
            }
            state.run_states.remove(id);
            Ok(())
        }

        async fn run_state(&self, id: &BindingId) -> Result<RunState, StoreError> {
            Ok(self.lock().run_states.entry(id.clone()).or_default().clone())
        }

        async fn save_run_state(&self, id: &BindingId, run: RunState) -> Result<(), StoreError> {
            let mut state = self.lock();
            if state.failing_saves.contains(id) {
                return Err(StoreError::Backend(format!("save failed for {id}")));
            }
            state.run_state_saves.push((id.clone(), run.clone()));
            state.run_states.insert(id.clone(), run);
            Ok(())
        }
    }

    #[async_trait]
    impl AccountStore for MemoryStore {
        async fn find_account(
            &self,
            user: &UserId,
            service_id: &str,
        ) -> Result<Option<ExternalAccount>, StoreError> {
            Ok(self.account(user, service_id))
        }

        async fn save_account(&self, account: ExternalAccount) -> Result<(), StoreError> {
            self.lock().account_saves.push(account.clone());
            self.add_account(account);
            Ok(())
        }
    }
}
