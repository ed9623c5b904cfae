#![allow(dead_code)]

use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tempfile::{TempDir, tempdir};

use csv_loader::error::{ImportError, Result};
use csv_loader::store::{StoreConnection, StoreConnector};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Everything a [`RecordingStore`] observed, in call order.
#[derive(Debug, Default)]
pub struct StoreLog {
    /// Each executed batch text (including any TRUNCATE statement).
    pub executed: Vec<String>,
    pub commits: usize,
    pub metadata_queries: Vec<String>,
}

/// Store double that records executed batches and serves a canned schema.
///
/// `fail_from` makes every execute fail once that many texts have already
/// succeeded, which exercises the abort-and-dump path.
pub struct RecordingStore {
    pub log: Rc<RefCell<StoreLog>>,
    pub schema_rows: Vec<Vec<String>>,
    pub fail_from: Option<usize>,
}

impl RecordingStore {
    pub fn new(schema_rows: Vec<Vec<String>>) -> Self {
        Self {
            log: Rc::new(RefCell::new(StoreLog::default())),
            schema_rows,
            fail_from: None,
        }
    }

    pub fn with_schema(columns: &[(&str, &str)]) -> Self {
        Self::new(
            columns
                .iter()
                .map(|(name, dtype)| vec![name.to_string(), dtype.to_string()])
                .collect(),
        )
    }

    pub fn failing_from(mut self, executed_count: usize) -> Self {
        self.fail_from = Some(executed_count);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.borrow().executed.clone()
    }

    pub fn commits(&self) -> usize {
        self.log.borrow().commits
    }
}

impl StoreConnector for RecordingStore {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        Ok(Box::new(RecordingConnection { store: self }))
    }
}

struct RecordingConnection<'a> {
    store: &'a RecordingStore,
}

impl StoreConnection for RecordingConnection<'_> {
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        self.store
            .log
            .borrow_mut()
            .metadata_queries
            .push(sql.to_string());
        Ok(self.store.schema_rows.clone())
    }

    fn execute(&mut self, sql: &str, _timeout: Option<Duration>) -> Result<()> {
        let mut log = self.store.log.borrow_mut();
        if let Some(limit) = self.store.fail_from {
            if log.executed.len() >= limit {
                return Err(ImportError::execution("simulated execute failure"));
            }
        }
        log.executed.push(sql.to_string());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.store.log.borrow_mut().commits += 1;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Store double whose connections can never be opened.
pub struct UnreachableStore;

impl StoreConnector for UnreachableStore {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        Err(ImportError::execution("store is unreachable"))
    }
}
