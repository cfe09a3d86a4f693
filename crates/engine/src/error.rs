// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine and binding provisioning

use rl_core::{ConnectorError, StoreError, ValidationError};
use std::time::Duration;
use thiserror::Error;

/// Which side of a binding an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Action,
    Reaction,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Action => write!(f, "action"),
            Role::Reaction => write!(f, "reaction"),
        }
    }
}

/// Binding-level failures of one engine cycle.
///
/// Everything except [`CycleError::UnknownDefinition`] is recorded as the
/// binding's `last_error` and retried on the next cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("unknown {role} definition '{id}'")]
    UnknownDefinition { role: Role, id: String },
    #[error("no linked {service_id} account for the {role} service")]
    MissingAccount { role: Role, service_id: String },
    #[error("could not start {role}: {source}")]
    Bind {
        role: Role,
        #[source]
        source: ConnectorError,
    },
    #[error("poll failed: {0}")]
    Poll(#[source] ConnectorError),
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from creating or changing bindings
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unknown {role} '{id}'")]
    UnknownDefinition { role: Role, id: String },
    #[error("invalid {role} configuration: {source}")]
    InvalidConfig {
        role: Role,
        #[source]
        source: ValidationError,
    },
    #[error("invalid binding: {0}")]
    InvalidBinding(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
