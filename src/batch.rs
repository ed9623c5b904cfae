//! Statement buffering and batched execution against the store.
//!
//! Statements accumulate into a pending buffer bounded by the effective
//! batch size: `min(configured_batch_size, remaining_row_count)`, so the
//! final flush of a job is sized exactly to what remains. A flush joins the
//! buffer with `;\n` and executes it as one operation on one scoped
//! connection, committing on success. There is no partial-batch retry and no
//! statement-level isolation: a failed batch aborts the run.

use std::{fs, path::PathBuf, time::Duration};

use log::{debug, info, warn};

use crate::{error::Result, store::StoreConnector};

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Forwarded to every execute call; `None` may block indefinitely.
    pub timeout: Option<Duration>,
    /// Where to persist the batch text when execution fails, overwriting
    /// prior content. `None` disables the diagnostic dump.
    pub dump_path: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: None,
            dump_path: None,
        }
    }
}

/// Owns one job run's pending buffer and success counter. Never share an
/// executor between jobs; state is scoped to a single run.
pub struct BatchExecutor<'a> {
    connector: &'a dyn StoreConnector,
    options: BatchOptions,
    pending: Vec<String>,
    executed: u64,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(connector: &'a dyn StoreConnector, options: BatchOptions) -> Self {
        Self {
            connector,
            options,
            pending: Vec::new(),
            executed: 0,
        }
    }

    /// Appends one statement; flushes once the buffer reaches the effective
    /// batch size for this call. `remaining` counts the not-yet-consumed data
    /// rows, including the one that produced this statement.
    pub fn accumulate(&mut self, statement: String, remaining: usize) -> Result<()> {
        self.pending.push(statement);
        let effective = self.options.batch_size.min(remaining);
        if self.pending.len() >= effective {
            self.flush()?;
        }
        Ok(())
    }

    /// Joins the buffer with `;\n`, executes it as one operation inside a
    /// single transaction scope, and commits. On success the buffer clears
    /// and the counter advances; on failure the batch text is optionally
    /// dumped and the error propagates, aborting the run.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let count = self.pending.len();
        let batch = self.pending.join(";\n");
        debug!("Executing {count} statement(s)...");
        let mut conn = self.connector.connect()?;
        let outcome = conn
            .execute(&batch, self.options.timeout)
            .and_then(|()| conn.commit());
        match outcome {
            Ok(()) => {
                conn.close()?;
                self.pending.clear();
                self.executed += count as u64;
                info!("Executed {count} statement(s), {} total.", self.executed);
                Ok(())
            }
            Err(err) => {
                self.dump_failed_batch(&batch);
                Err(err)
            }
        }
    }

    fn dump_failed_batch(&self, batch: &str) {
        let Some(path) = &self.options.dump_path else {
            return;
        };
        match fs::write(path, batch) {
            Ok(()) => warn!("Failed batch written to {path:?} for postmortem analysis"),
            Err(io_err) => warn!("Could not write failed batch to {path:?}: {io_err}"),
        }
    }

    /// Count of successfully executed statements this run.
    pub fn executed(&self) -> u64 {
        self.executed
    }
}
