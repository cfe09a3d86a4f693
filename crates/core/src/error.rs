// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared by the catalog, connectors, and stores

use thiserror::Error;

/// Bad user-supplied configuration. Surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from catalog registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("definition with id '{id}' is already registered")]
    DuplicateId { id: String },
}

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("binding not found: {0}")]
    BindingNotFound(String),
    #[error("binding already exists: {0}")]
    BindingExists(String),
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Errors raised by connector hooks, handlers, and API clients
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Non-2xx response from the external service
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("credentials unavailable: {0}")]
    Credentials(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A reaction could not carry out its side effect
    #[error("{0}")]
    Reaction(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConnectorError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectorError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
