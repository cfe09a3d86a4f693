// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-pass account lookups

use rl_core::{AccountStore, CredentialsListener, ExternalAccount, StoreError, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type AccountKey = (UserId, String);

/// Account lookups memoized for one engine pass.
///
/// Registered as the connectors' credentials listener: a refresh drops the
/// cached entry so the next lookup reads the stored, refreshed tokens.
pub(crate) struct AccountCache {
    store: Arc<dyn AccountStore>,
    entries: Mutex<HashMap<AccountKey, ExternalAccount>>,
}

impl AccountCache {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &AccountKey) -> Option<ExternalAccount> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub async fn get(
        &self,
        user: &UserId,
        service_id: &str,
    ) -> Result<Option<ExternalAccount>, StoreError> {
        let key = (user.clone(), service_id.to_string());
        if let Some(account) = self.cached(&key) {
            return Ok(Some(account));
        }
        let found = self.store.find_account(user, service_id).await?;
        if let Some(account) = &found {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.insert(key, account.clone());
        }
        Ok(found)
    }
}

impl CredentialsListener for AccountCache {
    fn credentials_updated(&self, account: &ExternalAccount) {
        let key = (account.user_id.clone(), account.service_id.clone());
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.remove(&key).is_some() {
            tracing::debug!(
                user_id = %account.user_id,
                service_id = %account.service_id,
                "invalidated cached account"
            );
        }
    }
}
