//! Per-job orchestration: read input, resolve schema, project rows, build
//! statements, and execute in bounded batches (or collect them in
//! script-only mode).
//!
//! Processing is strictly sequential: rows convert in input order and
//! batches execute in that same order, one at a time. An engine instance
//! serves exactly one job run; create a new one (or synchronize externally)
//! for each job.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};

use crate::{
    batch::{BatchExecutor, BatchOptions, DEFAULT_BATCH_SIZE},
    catalog::{self, ColumnSchema, TableRef},
    coerce::CoercionPolicy,
    error::{ImportError, Result},
    io_utils,
    project::{ProjectionPolicy, RowProjector},
    statement::{IdentifierQuoting, build_insert},
    store::StoreConnector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Execute batches against the store.
    #[default]
    Execute,
    /// Collect generated statements instead of executing them.
    ScriptOnly,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub delimiter: u8,
    pub batch_size: usize,
    pub mode: ExecutionMode,
    pub coercion: CoercionPolicy,
    pub projection: ProjectionPolicy,
    pub quoting: IdentifierQuoting,
    /// Issue `TRUNCATE TABLE` before the first batch (execute mode only).
    pub truncate: bool,
    pub timeout: Option<Duration>,
    /// Diagnostic path for the failed-batch dump; overwritten on each failure.
    pub dump_path: Option<PathBuf>,
    pub encoding: &'static Encoding,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            batch_size: DEFAULT_BATCH_SIZE,
            mode: ExecutionMode::Execute,
            coercion: CoercionPolicy::default(),
            projection: ProjectionPolicy::default(),
            quoting: IdentifierQuoting::default(),
            truncate: false,
            timeout: None,
            dump_path: None,
            encoding: UTF_8,
        }
    }
}

/// Outcome of one job run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub rows_read: u64,
    /// Malformed rows dropped by projection. Non-zero totals are surfaced as
    /// a warning at end of run; nothing about them is an error.
    pub rows_skipped: u64,
    /// Successfully executed statements (zero in script-only mode).
    pub executed: u64,
    /// Generated statements, populated in script-only mode.
    pub statements: Vec<String>,
}

pub struct ImportEngine<C: StoreConnector> {
    connector: C,
    options: ImportOptions,
}

impl<C: StoreConnector> ImportEngine<C> {
    pub fn new(connector: C, options: ImportOptions) -> Self {
        Self { connector, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Imports a delimited file (or stdin via `-`), resolving the schema
    /// from the store.
    pub fn import_path(&mut self, path: &Path, table: &TableRef) -> Result<RunReport> {
        let schema = catalog::fetch_columns(&self.connector, table)?;
        self.import_path_with_schema(path, table, &schema)
    }

    /// Imports in-memory delimited text, resolving the schema from the store.
    pub fn import_string(&mut self, content: &str, table: &TableRef) -> Result<RunReport> {
        let schema = catalog::fetch_columns(&self.connector, table)?;
        self.import_string_with_schema(content, table, &schema)
    }

    /// Imports a delimited file against an already-resolved schema, e.g. one
    /// loaded from a table-meta snapshot.
    pub fn import_path_with_schema(
        &mut self,
        path: &Path,
        table: &TableRef,
        schema: &[ColumnSchema],
    ) -> Result<RunReport> {
        let (header, rows) =
            io_utils::read_delimited_path(path, self.options.delimiter, self.options.encoding)?;
        self.run(table, schema, &header, &rows)
    }

    /// Imports in-memory delimited text against an already-resolved schema.
    pub fn import_string_with_schema(
        &mut self,
        content: &str,
        table: &TableRef,
        schema: &[ColumnSchema],
    ) -> Result<RunReport> {
        let (header, rows) = io_utils::read_delimited_str(content, self.options.delimiter)?;
        self.run(table, schema, &header, &rows)
    }

    fn run(
        &mut self,
        table: &TableRef,
        schema: &[ColumnSchema],
        header: &[String],
        rows: &[Vec<String>],
    ) -> Result<RunReport> {
        let qualified = table.qualified();
        if schema.is_empty() {
            return Err(ImportError::schema_lookup(
                qualified,
                "no importable columns resolved for the destination table",
            ));
        }
        let projector = RowProjector::new(header, schema, self.options.projection);
        if projector.columns().is_empty() {
            warn!("No header column in '{qualified}' matches the resolved schema; every row will be skipped");
        }
        debug!(
            "Aligned {} of {} header column(s) for '{qualified}'",
            projector.columns().len(),
            projector.header_len()
        );

        let script_only = self.options.mode == ExecutionMode::ScriptOnly;
        if !script_only && self.options.truncate {
            self.truncate_table(&qualified)?;
        }

        let mut report = RunReport::default();
        let mut executor = if script_only {
            None
        } else {
            Some(BatchExecutor::new(
                &self.connector,
                BatchOptions {
                    batch_size: self.options.batch_size,
                    timeout: self.options.timeout,
                    dump_path: self.options.dump_path.clone(),
                },
            ))
        };

        let total = rows.len();
        for (ix, raw) in rows.iter().enumerate() {
            report.rows_read += 1;
            let Some(values) = projector.project(raw) else {
                report.rows_skipped += 1;
                debug!("Skipping malformed row {} in '{qualified}'", ix + 2);
                continue;
            };
            let sql = build_insert(
                &qualified,
                projector.columns(),
                &values,
                schema,
                self.options.quoting,
                &self.options.coercion,
            )?;
            match executor.as_mut() {
                Some(executor) => executor.accumulate(sql, total - ix)?,
                None => report.statements.push(sql),
            }
        }

        if let Some(executor) = executor.as_mut() {
            // Trailing skipped rows can strand a partial batch below its
            // effective size; the terminal flush drains it.
            executor.flush()?;
            report.executed = executor.executed();
        }
        if report.rows_skipped > 0 {
            warn!(
                "Skipped {} malformed row(s) out of {} in '{qualified}'",
                report.rows_skipped, report.rows_read
            );
        }
        info!(
            "Finished '{qualified}': {} row(s) read, {} statement(s) {}",
            report.rows_read,
            if script_only {
                report.statements.len() as u64
            } else {
                report.executed
            },
            if script_only { "generated" } else { "executed" }
        );
        Ok(report)
    }

    fn truncate_table(&self, qualified: &str) -> Result<()> {
        info!("Truncating {qualified}");
        let mut conn = self.connector.connect()?;
        conn.execute(&format!("TRUNCATE TABLE {qualified}"), self.options.timeout)?;
        conn.commit()?;
        conn.close()?;
        Ok(())
    }
}
