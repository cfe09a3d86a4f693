// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage

use crate::operation::Operation;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store {} is in use by another process", .0.display())]
    Locked(PathBuf, #[source] io::Error),
}

/// Append-only JSON-lines log of operations
pub struct Wal {
    path: PathBuf,
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL, continuing its sequence numbering.
    /// Returns the log together with the operations replayed from it.
    pub fn open(path: &Path) -> Result<(Self, Vec<Operation>), WalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        let ops = Self::replay(path)?;
        let mut wal = Self {
            path: path.to_path_buf(),
            file,
            sequence: ops.len() as u64,
        };
        // Drop a torn tail so the next append starts on a fresh line
        if !ends_cleanly(path)? {
            wal.rewrite(&ops)?;
        }
        Ok((wal, ops))
    }

    /// Append an operation and fsync before returning
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let seq = self.sequence + 1;
        let line = serde_json::to_string(&WalEntry { seq, op: op.clone() })?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        self.sequence = seq;
        Ok(seq)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replace the log with `ops`, written to a temp file and renamed over
    pub fn rewrite(&mut self, ops: &[Operation]) -> Result<(), WalError> {
        let tmp = self.path.with_extension("wal.tmp");
        {
            let mut out = File::create(&tmp)?;
            for (i, op) in ops.iter().enumerate() {
                let entry = WalEntry {
                    seq: i as u64 + 1,
                    op: op.clone(),
                };
                writeln!(out, "{}", serde_json::to_string(&entry)?)?;
            }
            out.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).read(true).open(&self.path)?;
        self.sequence = ops.len() as u64;
        Ok(())
    }

    /// Replay all operations from the log.
    ///
    /// A torn final line (crash mid-append) is skipped; corruption anywhere
    /// else is an error.
    pub fn replay(path: &Path) -> Result<Vec<Operation>, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<String> = BufReader::new(file).lines().collect::<Result<_, _>>()?;
        let last = lines.len().saturating_sub(1);
        let mut ops = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<WalEntry>(line) {
                Ok(entry) => ops.push(entry.op),
                Err(e) if i == last => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping torn WAL tail");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(ops)
    }
}

fn ends_cleanly(path: &Path) -> Result<bool, WalError> {
    let bytes = fs::read(path)?;
    Ok(bytes.last().is_none_or(|&b| b == b'\n'))
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct WalEntry {
    seq: u64,
    op: Operation,
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
