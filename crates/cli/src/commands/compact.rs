// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store compaction

use super::Context;
use anyhow::Result;

pub fn handle(ctx: &Context) -> Result<()> {
    let (before, after) = ctx.store.compact()?;
    println!(
        "Compacted {}: {} operations -> {}",
        ctx.store.path().display(),
        before,
        after
    );
    Ok(())
}
