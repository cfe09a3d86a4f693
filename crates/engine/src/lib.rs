// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Relay automation engine and binding provisioning

mod accounts;
mod config;
mod cycle;
mod engine;
mod error;
mod locks;
pub mod provision;
mod report;

pub use config::EngineConfig;
pub use engine::{Engine, EngineDeps};
pub use error::{CycleError, ProvisionError, Role};
pub use provision::{BindingStatus, NewBinding, Provisioner};
pub use report::{BindingOutcome, BindingReport, RunReport};
