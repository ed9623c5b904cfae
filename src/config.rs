//! Job descriptors: which files load into which tables, and the connection
//! summary the caller turns into a live connector.
//!
//! Loaded from YAML. The database block is opaque to the conversion core;
//! the engine only ever sees the connector capability built from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    catalog::TableRef,
    error::{ImportError, Result},
    io_utils,
};

fn default_true() -> bool {
    true
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_file_delimiter() -> String {
    ";".to_string()
}

fn default_batch_size() -> usize {
    crate::batch::DEFAULT_BATCH_SIZE
}

/// Store connection summary. Consumed by whoever builds the connector; the
/// core treats it as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_server")]
    pub server: String,
    pub database: String,
    /// Trusted (integrated) authentication instead of credentials.
    #[serde(default)]
    pub trusted: bool,
}

/// One source file and its destination table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJob {
    pub source: PathBuf,
    pub table_schema: String,
    pub table_name: String,
    #[serde(default = "default_true")]
    pub include: bool,
    #[serde(default)]
    pub truncate: bool,
    #[serde(default = "default_file_delimiter")]
    pub delimiter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FileJob {
    pub fn table(&self) -> TableRef {
        TableRef::new(self.table_schema.clone(), self.table_name.clone())
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        io_utils::parse_delimiter(&self.delimiter).map_err(|e| {
            ImportError::config(format!(
                "File '{}': invalid delimiter '{}': {e}",
                self.source.display(),
                self.delimiter
            ))
        })
    }

    /// Source path, resolved against the job's csv_dir when relative.
    pub fn resolved_source(&self, csv_dir: Option<&Path>) -> PathBuf {
        match csv_dir {
            Some(dir) if self.source.is_relative() => dir.join(&self.source),
            _ => self.source.clone(),
        }
    }
}

/// A whole import job: one store, many files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    pub database: DatabaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_dir: Option<PathBuf>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub files: Vec<FileJob>,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImportError::config(format!(
                "Job file {path:?} does not exist"
            )));
        }
        let file = std::fs::File::open(path)?;
        let job: JobFile = serde_yaml::from_reader(file)
            .map_err(|e| ImportError::config(format!("Job file {path:?}: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::config("batch_size must be at least 1"));
        }
        if self.files.is_empty() {
            return Err(ImportError::config("Job file lists no files"));
        }
        for file in &self.files {
            if file.table_schema.is_empty() || file.table_name.is_empty() {
                return Err(ImportError::config(format!(
                    "File '{}' is missing a destination table",
                    file.source.display()
                )));
            }
            file.delimiter_byte()?;
        }
        Ok(())
    }

    /// Files selected for this run, in descriptor order.
    pub fn included(&self) -> impl Iterator<Item = &FileJob> {
        self.files.iter().filter(|file| file.include)
    }
}
