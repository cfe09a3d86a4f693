// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! rl-core: shared model and protocol for the Relay automation engine
//!
//! This crate provides:
//! - The persisted data model (bindings, run state, external accounts)
//! - The action/reaction protocol every connector implements
//! - The action and reaction catalog
//! - The checkpointed polling cursor used by polling actions
//! - Store traits consumed by the engine and by connectors

pub mod clock;
pub mod id;

pub mod account;
pub mod binding;
pub mod catalog;
pub mod checkpoint;
pub mod cursor;
pub mod definition;
pub mod error;
pub mod event;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

// Re-exports
pub use account::ExternalAccount;
pub use binding::{AutomationBinding, BindingId, Endpoint, RunState, UserId};
pub use catalog::{ActionRegistry, Catalog, ReactionRegistry, Registry};
pub use checkpoint::Checkpoint;
pub use clock::{Clock, SharedClock, SystemClock};
pub use cursor::{Candidate, Cursor, PollOutcome, PollingCheckpoint};
pub use definition::{
    ActionDefinition, BindContext, ConfigField, CredentialsListener, DefinitionInfo, FieldKind,
    FieldOption, Handler, Hook, HookOutput, ReactionDefinition,
};
pub use error::{CatalogError, ConnectorError, StoreError, ValidationError};
pub use event::{Event, Payload};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use store::{AccountStore, AutomationStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{fake_event, FakeAction, FakeReaction};
#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;
