// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed implementation of the store traits

use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use async_trait::async_trait;
use fs2::FileExt;
use rl_core::{
    AccountStore, AutomationBinding, AutomationStore, BindingId, ExternalAccount, RunState,
    StoreError, UserId,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const WAL_FILE: &str = "relay.wal";
const LOCK_FILE: &str = "relay.lock";

struct Inner {
    wal: Wal,
    state: MaterializedState,
    // Exclusive for the store's lifetime; released on drop
    _lock: File,
}

/// Durable store: every mutation is appended and fsynced, then applied
#[derive(Clone)]
pub struct WalStore {
    path: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl From<WalError> for StoreError {
    fn from(e: WalError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl WalStore {
    /// Open the store in `dir`, replaying any existing log.
    ///
    /// Takes an exclusive lock on the directory: a second opener, in this
    /// process or another, gets [`WalError::Locked`].
    pub fn open(dir: &Path) -> Result<Self, WalError> {
        fs::create_dir_all(dir)?;
        let lock_path = dir.join(LOCK_FILE);
        let lock = File::create(&lock_path)?;
        lock.try_lock_exclusive()
            .map_err(|e| WalError::Locked(dir.to_path_buf(), e))?;

        let path = dir.join(WAL_FILE);
        let (wal, ops) = Wal::open(&path)?;
        let state = MaterializedState::from_operations(&ops);
        tracing::debug!(
            path = %path.display(),
            operations = ops.len(),
            bindings = state.bindings.len(),
            "replayed store"
        );
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(Inner {
                wal,
                state,
                _lock: lock,
            })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn commit(inner: &mut Inner, op: Operation) -> Result<(), StoreError> {
        inner.wal.append(&op)?;
        inner.state.apply(&op);
        Ok(())
    }

    /// Rewrite the log as the minimal operation set for the current state.
    /// Returns (operations before, operations after).
    pub fn compact(&self) -> Result<(u64, u64), WalError> {
        let mut inner = self.lock();
        let before = inner.wal.sequence();
        let ops = inner.state.to_operations();
        inner.wal.rewrite(&ops)?;
        tracing::info!(before, after = ops.len(), "compacted store");
        Ok((before, ops.len() as u64))
    }

    pub fn accounts(&self) -> Vec<ExternalAccount> {
        self.lock().state.accounts.values().cloned().collect()
    }
}

#[async_trait]
impl AutomationStore for WalStore {
    async fn enabled_bindings(&self) -> Result<Vec<AutomationBinding>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .state
            .bindings_in_order()
            .into_iter()
            .filter(|b| b.enabled)
            .cloned()
            .collect())
    }

    async fn list_bindings(
        &self,
        owner: Option<&UserId>,
    ) -> Result<Vec<AutomationBinding>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .state
            .bindings_in_order()
            .into_iter()
            .filter(|b| owner.is_none_or(|o| &b.owner == o))
            .cloned()
            .collect())
    }

    async fn binding(&self, id: &BindingId) -> Result<Option<AutomationBinding>, StoreError> {
        Ok(self.lock().state.bindings.get(id).cloned())
    }

    async fn insert_binding(&self, binding: AutomationBinding) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.state.bindings.contains_key(&binding.id) {
            return Err(StoreError::BindingExists(binding.id.to_string()));
        }
        Self::commit(&mut inner, Operation::BindingCreate { binding })
    }

    async fn set_enabled(&self, id: &BindingId, enabled: bool) -> Result<(), StoreError> {
        let mut inner = self.lock();
        match inner.state.bindings.get(id) {
            None => return Err(StoreError::BindingNotFound(id.to_string())),
            Some(b) if b.enabled == enabled => return Ok(()),
            Some(_) => {}
        }
        Self::commit(
            &mut inner,
            Operation::BindingSetEnabled {
                id: id.clone(),
                enabled,
            },
        )
    }

    async fn delete_binding(&self, id: &BindingId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.state.bindings.contains_key(id) {
            return Err(StoreError::BindingNotFound(id.to_string()));
        }
        Self::commit(&mut inner, Operation::BindingDelete { id: id.clone() })
    }

    async fn run_state(&self, id: &BindingId) -> Result<RunState, StoreError> {
        let mut inner = self.lock();
        if let Some(state) = inner.state.run_states.get(id) {
            return Ok(state.clone());
        }
        if !inner.state.bindings.contains_key(id) {
            return Err(StoreError::BindingNotFound(id.to_string()));
        }
        let state = RunState::default();
        Self::commit(
            &mut inner,
            Operation::RunStateSave {
                id: id.clone(),
                state: state.clone(),
            },
        )?;
        Ok(state)
    }

    async fn save_run_state(&self, id: &BindingId, state: RunState) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.state.bindings.contains_key(id) {
            return Err(StoreError::BindingNotFound(id.to_string()));
        }
        Self::commit(
            &mut inner,
            Operation::RunStateSave {
                id: id.clone(),
                state,
            },
        )
    }
}

#[async_trait]
impl AccountStore for WalStore {
    async fn find_account(
        &self,
        user: &UserId,
        service_id: &str,
    ) -> Result<Option<ExternalAccount>, StoreError> {
        Ok(self.lock().state.account(user, service_id).cloned())
    }

    async fn save_account(&self, account: ExternalAccount) -> Result<(), StoreError> {
        let mut inner = self.lock();
        Self::commit(&mut inner, Operation::AccountSave { account })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
