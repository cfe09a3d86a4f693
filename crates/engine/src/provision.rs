// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creating and managing bindings
//!
//! Configs are validated and normalized by the definitions themselves before
//! anything is stored.

use crate::error::{ProvisionError, Role};
use rl_core::{
    AutomationBinding, AutomationStore, BindingId, Catalog, Clock, Endpoint, IdGen, RunState,
    SharedClock, StoreError, UserId,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const NAME_LEN: std::ops::RangeInclusive<usize> = 3..=255;
const MAX_DESCRIPTION_LEN: usize = 2000;

/// Request to create a binding
#[derive(Debug, Clone)]
pub struct NewBinding {
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
    pub action_id: String,
    pub action_config: Value,
    pub reaction_id: String,
    pub reaction_config: Value,
    pub enabled: bool,
}

/// A binding with its run state
#[derive(Debug, Clone, Serialize)]
pub struct BindingStatus {
    #[serde(flatten)]
    pub binding: AutomationBinding,
    pub state: RunState,
}

/// Binding management backed by the catalog and the store
pub struct Provisioner {
    catalog: Arc<Catalog>,
    store: Arc<dyn AutomationStore>,
    clock: SharedClock,
    ids: Arc<dyn IdGen>,
}

/// `None` for anything but a non-empty object
fn stored_config(config: Value) -> Option<Value> {
    match config {
        Value::Object(map) if !map.is_empty() => Some(Value::Object(map)),
        _ => None,
    }
}

fn raw_config(config: Value) -> Value {
    match config {
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

impl Provisioner {
    pub fn new(
        catalog: Arc<Catalog>,
        store: Arc<dyn AutomationStore>,
        clock: SharedClock,
        ids: Arc<dyn IdGen>,
    ) -> Self {
        Self {
            catalog,
            store,
            clock,
            ids,
        }
    }

    /// Validate both configs through their definitions and store the binding
    /// with an empty run state
    pub async fn create_binding(
        &self,
        request: NewBinding,
    ) -> Result<AutomationBinding, ProvisionError> {
        let name = request.name.trim().to_string();
        if !NAME_LEN.contains(&name.chars().count()) {
            return Err(ProvisionError::InvalidBinding(format!(
                "name must be between {} and {} characters",
                NAME_LEN.start(),
                NAME_LEN.end()
            )));
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(ProvisionError::InvalidBinding(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        let action_id = request.action_id.trim();
        let action = self
            .catalog
            .action(action_id)
            .ok_or_else(|| ProvisionError::UnknownDefinition {
                role: Role::Action,
                id: action_id.to_string(),
            })?;
        let reaction_id = request.reaction_id.trim();
        let reaction = self
            .catalog
            .reaction(reaction_id)
            .ok_or_else(|| ProvisionError::UnknownDefinition {
                role: Role::Reaction,
                id: reaction_id.to_string(),
            })?;

        let action_config = action
            .validate_config(&raw_config(request.action_config))
            .map_err(|source| ProvisionError::InvalidConfig {
                role: Role::Action,
                source,
            })?;
        let reaction_config = reaction
            .validate_config(&raw_config(request.reaction_config))
            .map_err(|source| ProvisionError::InvalidConfig {
                role: Role::Reaction,
                source,
            })?;

        let binding = AutomationBinding {
            id: BindingId::new(self.ids.next()),
            owner: request.owner,
            name,
            description,
            enabled: request.enabled,
            action: Endpoint {
                definition_id: action.info().id.clone(),
                service_id: action.info().service_id.clone(),
                config: stored_config(action_config),
            },
            reaction: Endpoint {
                definition_id: reaction.info().id.clone(),
                service_id: reaction.info().service_id.clone(),
                config: stored_config(reaction_config),
            },
            created_at: self.clock.now(),
        };
        self.store.insert_binding(binding.clone()).await?;
        self.store.run_state(&binding.id).await?;
        tracing::info!(
            binding_id = %binding.id,
            owner = %binding.owner,
            action_id = %binding.action.definition_id,
            reaction_id = %binding.reaction.definition_id,
            "binding created"
        );
        Ok(binding)
    }

    pub async fn list_bindings(
        &self,
        owner: Option<&UserId>,
    ) -> Result<Vec<AutomationBinding>, ProvisionError> {
        Ok(self.store.list_bindings(owner).await?)
    }

    pub async fn set_enabled(&self, id: &BindingId, enabled: bool) -> Result<(), ProvisionError> {
        self.store.set_enabled(id, enabled).await?;
        tracing::info!(binding_id = %id, enabled, "binding updated");
        Ok(())
    }

    /// Remove a binding and its run state
    pub async fn delete_binding(&self, id: &BindingId) -> Result<(), ProvisionError> {
        self.store.delete_binding(id).await?;
        tracing::info!(binding_id = %id, "binding deleted");
        Ok(())
    }

    pub async fn binding_status(&self, id: &BindingId) -> Result<BindingStatus, ProvisionError> {
        let binding = self
            .store
            .binding(id)
            .await?
            .ok_or_else(|| StoreError::BindingNotFound(id.to_string()))?;
        let state = self.store.run_state(id).await?;
        Ok(BindingStatus { binding, state })
    }
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
