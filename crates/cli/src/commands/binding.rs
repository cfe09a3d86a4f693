// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binding commands

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use rl_core::{AutomationBinding, BindingId, UserId};
use rl_engine::{BindingStatus, NewBinding};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Subcommand)]
pub enum BindingCommand {
    /// Create a binding from an action and a reaction
    Create {
        /// Owning user
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Action definition id
        #[arg(long)]
        action: String,
        /// Action configuration as a JSON object
        #[arg(long)]
        action_config: Option<String>,
        /// Reaction definition id
        #[arg(long)]
        reaction: String,
        /// Reaction configuration as a JSON object
        #[arg(long)]
        reaction_config: Option<String>,
        /// Create the binding disabled
        #[arg(long)]
        disabled: bool,
    },
    /// List bindings
    List {
        /// Only bindings owned by this user
        #[arg(long)]
        user: Option<String>,
    },
    /// Enable a binding
    Enable { id: String },
    /// Disable a binding
    Disable { id: String },
    /// Delete a binding and its run state
    Delete { id: String },
    /// Show a binding with its run state
    Status { id: String },
}

fn parse_config(flag: &str, raw: Option<&str>) -> Result<Value> {
    match raw {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text).with_context(|| format!("{flag} is not valid JSON")),
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct BindingRow(AutomationBinding);

impl fmt::Display for BindingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:<38} {:<8} {:<30} {:<30} {}",
            b.id,
            if b.enabled { "yes" } else { "no" },
            b.action.definition_id,
            b.reaction.definition_id,
            b.name
        )
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct Created(AutomationBinding);

impl fmt::Display for Created {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Created binding {}", self.0.id)
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct StatusView(BindingStatus);

fn or_dash<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let BindingStatus { binding, state } = &self.0;
        writeln!(f, "Binding: {}", binding.name)?;
        writeln!(f, "  ID: {}", binding.id)?;
        writeln!(f, "  Owner: {}", binding.owner)?;
        writeln!(f, "  Enabled: {}", binding.enabled)?;
        writeln!(f, "  Action: {}", binding.action.definition_id)?;
        if let Some(config) = &binding.action.config {
            writeln!(f, "    Config: {}", config)?;
        }
        writeln!(f, "  Reaction: {}", binding.reaction.definition_id)?;
        if let Some(config) = &binding.reaction.config {
            writeln!(f, "    Config: {}", config)?;
        }
        writeln!(f, "  Last run: {}", or_dash(&state.last_run_at))?;
        writeln!(f, "  Last event: {}", or_dash(&state.last_event_at))?;
        write!(f, "  Last error: {}", or_dash(&state.last_error))
    }
}

pub async fn handle(command: BindingCommand, ctx: &Context, format: OutputFormat) -> Result<()> {
    let provisioner = ctx.provisioner();
    match command {
        BindingCommand::Create {
            user,
            name,
            description,
            action,
            action_config,
            reaction,
            reaction_config,
            disabled,
        } => {
            let request = NewBinding {
                owner: UserId::new(user),
                name,
                description,
                action_id: action,
                action_config: parse_config("--action-config", action_config.as_deref())?,
                reaction_id: reaction,
                reaction_config: parse_config("--reaction-config", reaction_config.as_deref())?,
                enabled: !disabled,
            };
            let binding = provisioner.create_binding(request).await?;
            output::print(&Created(binding), format);
        }
        BindingCommand::List { user } => {
            let owner = user.map(UserId::new);
            let rows: Vec<BindingRow> = provisioner
                .list_bindings(owner.as_ref())
                .await?
                .into_iter()
                .map(BindingRow)
                .collect();
            output::print_list(
                &rows,
                &format!(
                    "{:<38} {:<8} {:<30} {:<30} NAME",
                    "ID", "ENABLED", "ACTION", "REACTION"
                ),
                "No bindings",
                format,
            );
        }
        BindingCommand::Enable { id } => {
            provisioner.set_enabled(&BindingId::new(&id), true).await?;
            println!("Enabled binding {}", id);
        }
        BindingCommand::Disable { id } => {
            provisioner.set_enabled(&BindingId::new(&id), false).await?;
            println!("Disabled binding {}", id);
        }
        BindingCommand::Delete { id } => {
            provisioner.delete_binding(&BindingId::new(&id)).await?;
            println!("Deleted binding {}", id);
        }
        BindingCommand::Status { id } => {
            let status = provisioner.binding_status(&BindingId::new(id)).await?;
            output::print(&StatusView(status), format);
        }
    }
    Ok(())
}
