// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::operation::Operation;
use rl_core::{AutomationBinding, BindingId, ExternalAccount, RunState, UserId};
use std::collections::{BTreeMap, HashMap};

/// State built by applying operations in log order
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub bindings: BTreeMap<BindingId, AutomationBinding>,
    pub run_states: HashMap<BindingId, RunState>,
    pub accounts: BTreeMap<(UserId, String), ExternalAccount>,
}

impl MaterializedState {
    /// Rebuild state from a sequence of operations
    pub fn from_operations<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    /// Bindings ordered by creation time, then id
    pub fn bindings_in_order(&self) -> Vec<&AutomationBinding> {
        let mut bindings: Vec<_> = self.bindings.values().collect();
        bindings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        bindings
    }

    pub fn account(&self, user: &UserId, service_id: &str) -> Option<&ExternalAccount> {
        self.accounts.get(&(user.clone(), service_id.to_string()))
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::BindingCreate { binding } => {
                self.bindings.insert(binding.id.clone(), binding.clone());
            }

            Operation::BindingSetEnabled { id, enabled } => {
                if let Some(binding) = self.bindings.get_mut(id) {
                    binding.enabled = *enabled;
                }
            }

            Operation::BindingDelete { id } => {
                self.bindings.remove(id);
                self.run_states.remove(id);
            }

            Operation::RunStateSave { id, state } => {
                // Ignore run state for bindings deleted mid-cycle
                if self.bindings.contains_key(id) {
                    self.run_states.insert(id.clone(), state.clone());
                }
            }

            Operation::AccountSave { account } => {
                self.accounts.insert(
                    (account.user_id.clone(), account.service_id.clone()),
                    account.clone(),
                );
            }
        }
    }

    /// Minimal operation list that rebuilds this state
    pub fn to_operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        for account in self.accounts.values() {
            ops.push(Operation::AccountSave {
                account: account.clone(),
            });
        }
        for binding in self.bindings_in_order() {
            ops.push(Operation::BindingCreate {
                binding: binding.clone(),
            });
            if let Some(state) = self.run_states.get(&binding.id) {
                ops.push(Operation::RunStateSave {
                    id: binding.id.clone(),
                    state: state.clone(),
                });
            }
        }
        ops
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
