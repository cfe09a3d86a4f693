// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results of an engine pass

use rl_core::BindingId;
use serde::Serialize;

/// How one binding's cycle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindingOutcome {
    /// Polled successfully; reaction failures are per event
    Completed {
        events: usize,
        delivered: usize,
        reaction_failures: usize,
    },
    /// Binding-level failure, recorded as `last_error`
    Failed { error: String },
    /// References a definition that no longer exists
    Disabled { reason: String },
    /// A previous cycle for the binding was still running
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingReport {
    pub binding_id: BindingId,
    #[serde(flatten)]
    pub outcome: BindingOutcome,
}

/// Summary of one pass over the enabled bindings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub bindings: usize,
    pub completed: usize,
    pub failed: usize,
    pub disabled: usize,
    pub skipped: usize,
    pub events_delivered: usize,
    pub reaction_failures: usize,
    pub outcomes: Vec<BindingReport>,
}

impl RunReport {
    pub fn record(&mut self, binding_id: BindingId, outcome: BindingOutcome) {
        self.bindings += 1;
        match &outcome {
            BindingOutcome::Completed {
                delivered,
                reaction_failures,
                ..
            } => {
                self.completed += 1;
                self.events_delivered += delivered;
                self.reaction_failures += reaction_failures;
            }
            BindingOutcome::Failed { .. } => self.failed += 1,
            BindingOutcome::Disabled { .. } => self.disabled += 1,
            BindingOutcome::Skipped => self.skipped += 1,
        }
        self.outcomes.push(BindingReport {
            binding_id,
            outcome,
        });
    }

    pub fn outcome(&self, binding_id: &BindingId) -> Option<&BindingOutcome> {
        self.outcomes
            .iter()
            .find(|r| &r.binding_id == binding_id)
            .map(|r| &r.outcome)
    }
}
