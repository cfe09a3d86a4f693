// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logged state mutations

use rl_core::{AutomationBinding, BindingId, ExternalAccount, RunState};
use serde::{Deserialize, Serialize};

/// One durable mutation, appended to the log before it is applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    BindingCreate { binding: AutomationBinding },
    BindingSetEnabled { id: BindingId, enabled: bool },
    BindingDelete { id: BindingId },
    RunStateSave { id: BindingId, state: RunState },
    AccountSave { account: ExternalAccount },
}
