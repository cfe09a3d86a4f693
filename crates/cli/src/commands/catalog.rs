// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog listing

use crate::output::{self, OutputFormat};
use rl_core::{Catalog, DefinitionInfo};
use serde::Serialize;
use std::fmt;

#[derive(clap::Args)]
pub struct CatalogArgs {
    /// Only definitions of this service
    #[arg(long)]
    service: Option<String>,

    /// List reactions instead of actions
    #[arg(long)]
    reactions: bool,
}

#[derive(Serialize)]
#[serde(transparent)]
struct DefinitionRow(DefinitionInfo);

impl fmt::Display for DefinitionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.0;
        let fields: Vec<String> = info
            .fields
            .iter()
            .map(|field| {
                if field.required {
                    field.name.clone()
                } else {
                    format!("{}?", field.name)
                }
            })
            .collect();
        write!(
            f,
            "{:<32} {:<10} {:<28} {}",
            info.id,
            info.service_id,
            info.display_name,
            fields.join(",")
        )
    }
}

fn rows(catalog: &Catalog, args: &CatalogArgs) -> Vec<DefinitionRow> {
    let infos: Vec<DefinitionInfo> = match (&args.service, args.reactions) {
        (Some(service), false) => catalog
            .actions
            .list_by_service(service)
            .iter()
            .map(|d| d.info().clone())
            .collect(),
        (None, false) => catalog
            .actions
            .list_all()
            .iter()
            .map(|d| d.info().clone())
            .collect(),
        (Some(service), true) => catalog
            .reactions
            .list_by_service(service)
            .iter()
            .map(|d| d.info().clone())
            .collect(),
        (None, true) => catalog
            .reactions
            .list_all()
            .iter()
            .map(|d| d.info().clone())
            .collect(),
    };
    infos.into_iter().map(DefinitionRow).collect()
}

pub fn handle(args: CatalogArgs, catalog: &Catalog, format: OutputFormat) {
    let kind = if args.reactions { "reactions" } else { "actions" };
    output::print_list(
        &rows(catalog, &args),
        &format!("{:<32} {:<10} {:<28} FIELDS", "ID", "SERVICE", "NAME"),
        &format!("No {kind} found"),
        format,
    );
}
