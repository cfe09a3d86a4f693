// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rl - Relay automation CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{account, binding, catalog, compact, run, Context};
use config::Config;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rl",
    version,
    about = "Relay - connect service events to actions in other services"
)]
struct Cli {
    /// Config file (defaults to $RELAY_CONFIG, then ~/.config/relay/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available actions or reactions
    Catalog(catalog::CatalogArgs),
    /// Linked account management
    Account {
        #[command(subcommand)]
        command: account::AccountCommand,
    },
    /// Binding management
    Binding {
        #[command(subcommand)]
        command: binding::BindingCommand,
    },
    /// Run one engine pass over all enabled bindings
    Run,
    /// Run engine passes on an interval until interrupted
    Serve(run::ServeArgs),
    /// Rewrite the store log to its minimal form
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format;

    let (level, log_file) = match &cli.command {
        Commands::Run => ("info", None),
        Commands::Serve(args) => ("info", args.log_file.as_deref()),
        _ => ("warn", None),
    };
    let _log_guard = logging::init(level, log_file)?;

    match cli.command {
        Commands::Catalog(args) => {
            let definitions = commands::build_catalog(&config)?;
            catalog::handle(args, &definitions, format);
        }
        Commands::Account { command } => {
            account::handle(command, &Context::open(&config)?, format).await?
        }
        Commands::Binding { command } => {
            binding::handle(command, &Context::open(&config)?, format).await?
        }
        Commands::Run => run::run(&Context::open(&config)?, format).await?,
        Commands::Serve(args) => {
            let interval = args.interval.unwrap_or(config.engine.interval);
            run::serve(&Context::open(&config)?, interval).await?
        }
        Commands::Compact => compact::handle(&Context::open(&config)?)?,
    }

    Ok(())
}
