// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action and reaction catalog
//!
//! Built once at start-up and shared read-only afterwards.

use crate::definition::{ActionDefinition, DefinitionInfo, ReactionDefinition};
use crate::error::CatalogError;
use std::collections::HashMap;
use std::sync::Arc;

/// Anything that can be stored in a registry
pub trait Registered {
    fn registered_info(&self) -> &DefinitionInfo;
}

impl Registered for dyn ActionDefinition {
    fn registered_info(&self) -> &DefinitionInfo {
        self.info()
    }
}

impl Registered for dyn ReactionDefinition {
    fn registered_info(&self) -> &DefinitionInfo {
        self.info()
    }
}

/// Id-unique definitions in registration order
pub struct Registry<T: ?Sized + Registered> {
    entries: Vec<Arc<T>>,
    index: HashMap<String, usize>,
}

impl<T: ?Sized + Registered> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: ?Sized + Registered> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: Arc<T>) -> Result<(), CatalogError> {
        let id = definition.registered_info().id.clone();
        if self.index.contains_key(&id) {
            return Err(CatalogError::DuplicateId { id });
        }
        tracing::debug!(id = %id, service_id = %definition.registered_info().service_id, "registered definition");
        self.index.insert(id, self.entries.len());
        self.entries.push(definition);
        Ok(())
    }

    /// Registers in order; definitions before a duplicate stay registered
    pub fn register_many(
        &mut self,
        definitions: impl IntoIterator<Item = Arc<T>>,
    ) -> Result<(), CatalogError> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<Arc<T>> {
        self.index.get(id).map(|&i| Arc::clone(&self.entries[i]))
    }

    pub fn list_all(&self) -> Vec<Arc<T>> {
        self.entries.clone()
    }

    pub fn list_by_service(&self, service_id: &str) -> Vec<Arc<T>> {
        self.entries
            .iter()
            .filter(|d| d.registered_info().service_id == service_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type ActionRegistry = Registry<dyn ActionDefinition>;
pub type ReactionRegistry = Registry<dyn ReactionDefinition>;

/// Both registries, constructed explicitly at start-up
#[derive(Default)]
pub struct Catalog {
    pub actions: ActionRegistry,
    pub reactions: ReactionRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self, id: &str) -> Option<Arc<dyn ActionDefinition>> {
        self.actions.find(id)
    }

    pub fn reaction(&self, id: &str) -> Option<Arc<dyn ReactionDefinition>> {
        self.reactions.find(id)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
