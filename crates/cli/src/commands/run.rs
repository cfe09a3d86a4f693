// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine passes: one-shot `run` and the `serve` loop

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use rl_engine::{BindingOutcome, RunReport};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Delay between passes (e.g. "30s", "5m"); defaults to the configured interval
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(transparent)]
struct Summary(RunReport);

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.0;
        write!(
            f,
            "{} bindings: {} completed, {} failed, {} disabled, {} skipped; {} events delivered, {} reaction failures",
            r.bindings,
            r.completed,
            r.failed,
            r.disabled,
            r.skipped,
            r.events_delivered,
            r.reaction_failures
        )?;
        for report in &r.outcomes {
            match &report.outcome {
                BindingOutcome::Failed { error } => {
                    write!(f, "\n  {} failed: {}", report.binding_id, error)?
                }
                BindingOutcome::Disabled { reason } => {
                    write!(f, "\n  {} disabled: {}", report.binding_id, reason)?
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// One pass over every enabled binding
pub async fn run(ctx: &Context, format: OutputFormat) -> Result<()> {
    let report = ctx.engine().run_once().await?;
    output::print(&Summary(report), format);
    Ok(())
}

/// Repeated passes until SIGINT or SIGTERM.
///
/// Each pass is awaited before the next tick, so passes never overlap. A
/// signal that arrives mid-pass takes effect once the pass finishes.
pub async fn serve(ctx: &Context, interval: Duration) -> Result<()> {
    let engine = ctx.engine();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(interval_ms, "serving");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = engine.run_once().await {
                    tracing::error!(error = %e, "engine pass failed");
                }
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    tracing::info!("stopped");
    Ok(())
}
