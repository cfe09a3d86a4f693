// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action/reaction protocol implemented by every connector

use crate::account::ExternalAccount;
use crate::checkpoint::Checkpoint;
use crate::clock::SharedClock;
use crate::error::{ConnectorError, ValidationError};
use crate::event::{Event, Payload};
use crate::store::AccountStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Input widget kind for a configurable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Select,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Describes one user-configurable parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl ConfigField {
    pub fn text(name: &str, label: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::String,
            description: None,
            required,
            placeholder: None,
            options: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }
}

/// Identity and display metadata shared by actions and reactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionInfo {
    pub id: String,
    pub service_id: String,
    pub display_name: String,
    pub description: String,
    pub fields: Vec<ConfigField>,
    /// Scheduling hint only; the engine does not enforce it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_secs"
    )]
    pub min_poll_interval: Option<Duration>,
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

/// Notified after a connector durably refreshed an account's tokens
pub trait CredentialsListener: Send + Sync {
    fn credentials_updated(&self, account: &ExternalAccount);
}

/// Everything a hook or handler is bound to besides its config
#[derive(Clone)]
pub struct BindContext {
    pub account: ExternalAccount,
    pub accounts: Arc<dyn AccountStore>,
    pub clock: SharedClock,
    pub credentials_listener: Option<Arc<dyn CredentialsListener>>,
}

/// What one successful poll produced
#[derive(Debug, Clone, PartialEq)]
pub struct HookOutput {
    pub checkpoint: Checkpoint,
    /// Ascending by `occurred_at`
    pub events: Vec<Event>,
}

/// Stateful poller for one binding and one cycle
#[async_trait]
pub trait Hook: Send {
    fn load_checkpoint(&mut self, checkpoint: Option<Checkpoint>) -> Result<(), ConnectorError>;

    async fn execute(&mut self) -> Result<HookOutput, ConnectorError>;
}

/// Side effect invoked once per event
#[async_trait]
pub trait Handler: Send + Sync {
    async fn execute(&self, payload: &Payload) -> Result<(), ConnectorError>;
}

#[async_trait]
pub trait ActionDefinition: Send + Sync {
    fn info(&self) -> &DefinitionInfo;

    /// Validate and normalize raw user config
    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError>;

    async fn create_hook(
        &self,
        ctx: BindContext,
        config: &Value,
    ) -> Result<Box<dyn Hook>, ConnectorError>;
}

#[async_trait]
pub trait ReactionDefinition: Send + Sync {
    fn info(&self) -> &DefinitionInfo;

    /// Validate and normalize raw user config
    fn validate_config(&self, raw: &Value) -> Result<Value, ValidationError>;

    async fn create_handler(
        &self,
        ctx: BindContext,
        config: &Value,
    ) -> Result<Box<dyn Handler>, ConnectorError>;
}

/// Read a typed config object, treating `null` as `{}`
pub fn parse_config<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, ValidationError> {
    let raw = match raw {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    if !raw.is_object() {
        return Err(ValidationError::new("configuration must be an object"));
    }
    serde_json::from_value(raw).map_err(|e| ValidationError::new(format!("invalid configuration: {e}")))
}
