// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linked account management
//!
//! Stands in for the OAuth login flow: tokens obtained elsewhere are stored
//! directly.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use rl_core::{AccountStore, Clock, ExternalAccount, SystemClock, UserId};
use serde::Serialize;
use std::fmt;

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Link (or update) a user's tokens for a service
    Set {
        #[arg(long)]
        user: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        access_token: Option<String>,
        #[arg(long)]
        refresh_token: Option<String>,
        /// Seconds until the access token expires
        #[arg(long)]
        expires_in: Option<i64>,
        /// Account id at the provider
        #[arg(long)]
        provider_account_id: Option<String>,
    },
    /// List linked accounts (tokens are never shown)
    List {
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Serialize)]
struct AccountInfo {
    user_id: UserId,
    service_id: String,
    provider_account_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    has_access_token: bool,
    has_refresh_token: bool,
}

impl From<&ExternalAccount> for AccountInfo {
    fn from(account: &ExternalAccount) -> Self {
        Self {
            user_id: account.user_id.clone(),
            service_id: account.service_id.clone(),
            provider_account_id: account.provider_account_id.clone(),
            expires_at: account.expires_at,
            has_access_token: account.access_token.is_some(),
            has_refresh_token: account.refresh_token.is_some(),
        }
    }
}

impl fmt::Display for AccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expires = self
            .expires_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:<20} {:<10} {:<26} {}",
            self.user_id,
            self.service_id,
            expires,
            if self.has_refresh_token { "yes" } else { "no" }
        )
    }
}

pub async fn handle(command: AccountCommand, ctx: &Context, format: OutputFormat) -> Result<()> {
    match command {
        AccountCommand::Set {
            user,
            service,
            access_token,
            refresh_token,
            expires_in,
            provider_account_id,
        } => {
            let user = UserId::new(user);
            let mut account = ctx
                .store
                .find_account(&user, &service)
                .await?
                .unwrap_or_else(|| ExternalAccount::new(user, service));
            if access_token.is_some() {
                account.access_token = access_token;
                account.expires_at = None;
            }
            if refresh_token.is_some() {
                account.refresh_token = refresh_token;
            }
            if let Some(secs) = expires_in {
                account.expires_at = Some(expiry_after(SystemClock.now(), secs)?);
            }
            if provider_account_id.is_some() {
                account.provider_account_id = provider_account_id;
            }
            ctx.store.save_account(account.clone()).await?;
            tracing::info!(
                user_id = %account.user_id,
                service_id = %account.service_id,
                "account linked"
            );
            output::print(&Linked(AccountInfo::from(&account)), format);
        }
        AccountCommand::List { user } => {
            let accounts: Vec<AccountInfo> = ctx
                .store
                .accounts()
                .iter()
                .filter(|a| user.as_deref().is_none_or(|u| a.user_id.as_str() == u))
                .map(AccountInfo::from)
                .collect();
            output::print_list(
                &accounts,
                &format!("{:<20} {:<10} {:<26} REFRESH", "USER", "SERVICE", "EXPIRES"),
                "No accounts linked",
                format,
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct Linked(AccountInfo);

impl fmt::Display for Linked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Linked {} account for {}",
            self.0.service_id, self.0.user_id
        )
    }
}

/// Token expiry `secs` after `now`; negative lifetimes mean already expired
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Result<DateTime<Utc>> {
    chrono::Duration::try_seconds(secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("--expires-in {secs} is out of range"))
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
