use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use crate::io_utils::parse_delimiter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert delimited text into batched SQL INSERT statements", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate an INSERT script from a CSV file and a table-meta definition
    Script(ScriptArgs),
    /// Materialize INSERT scripts for every included file in a job descriptor
    Run(RunArgs),
    /// List the columns a table-meta file defines
    Columns(ColumnsArgs),
    /// Validate a job descriptor and summarize its entries
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct ScriptArgs {
    /// Input CSV file to convert ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Table-meta YAML file describing the destination table
    #[arg(short, long)]
    pub meta: PathBuf,
    /// Destination .sql script path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Quote identifiers with double quotes instead of square brackets
    #[arg(long = "double-quotes")]
    pub double_quotes: bool,
    /// Keep sentinel tokens (n/a, undefined, null, none) as text instead of NULL
    #[arg(long = "keep-sentinels")]
    pub keep_sentinels: bool,
    /// Accept rows that align to zero columns instead of skipping them
    #[arg(long = "allow-empty-rows")]
    pub allow_empty_rows: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Job descriptor YAML file
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Directory receiving one .sql script per included file
    #[arg(short = 'o', long = "scripts-dir")]
    pub scripts_dir: PathBuf,
    /// Directory holding one table-meta YAML per destination table
    /// (<schema>.<table>.yaml)
    #[arg(long = "meta-dir")]
    pub meta_dir: PathBuf,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Quote identifiers with double quotes instead of square brackets
    #[arg(long = "double-quotes")]
    pub double_quotes: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Table-meta YAML file to list
    #[arg(short, long)]
    pub meta: PathBuf,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Job descriptor YAML file to validate
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
}
