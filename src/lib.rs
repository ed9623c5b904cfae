pub mod batch;
pub mod catalog;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod io_utils;
pub mod project;
pub mod sanitize;
pub mod statement;
pub mod store;
pub mod value;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    catalog::TableMeta,
    cli::{Cli, ColumnsArgs, Commands, RunArgs, ScriptArgs},
    coerce::CoercionPolicy,
    config::JobFile,
    engine::{ExecutionMode, ImportEngine, ImportOptions},
    project::ProjectionPolicy,
    statement::IdentifierQuoting,
    store::NoStore,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Script(args) => handle_script(&args),
        Commands::Run(args) => handle_run(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Check(args) => handle_check(&args),
    }
}

fn handle_script(args: &ScriptArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let meta = TableMeta::load(&args.meta)
        .with_context(|| format!("Loading table meta from {:?}", args.meta))?;
    info!(
        "Scripting '{}' for {} with delimiter '{}'",
        args.input.display(),
        meta.table(),
        printable_delimiter(delimiter)
    );

    let options = ImportOptions {
        delimiter,
        mode: ExecutionMode::ScriptOnly,
        coercion: script_coercion(args.keep_sentinels),
        projection: ProjectionPolicy {
            allow_empty_rows: args.allow_empty_rows,
        },
        quoting: script_quoting(args.double_quotes),
        encoding,
        ..ImportOptions::default()
    };
    let mut engine = ImportEngine::new(NoStore, options);
    let report = engine
        .import_path_with_schema(&args.input, &meta.table(), &meta.columns)
        .with_context(|| format!("Converting {:?}", args.input))?;
    io_utils::write_script(&args.output, &report.statements)
        .with_context(|| format!("Writing script to {:?}", args.output))?;
    info!(
        "Wrote {} statement(s) to {:?} ({} row(s) skipped)",
        report.statements.len(),
        args.output,
        report.rows_skipped
    );
    Ok(())
}

fn handle_run(args: &RunArgs) -> Result<()> {
    let job = JobFile::load(&args.config)
        .with_context(|| format!("Loading job file from {:?}", args.config))?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    std::fs::create_dir_all(&args.scripts_dir)
        .with_context(|| format!("Creating scripts directory {:?}", args.scripts_dir))?;

    let excluded = job.files.len() - job.included().count();
    if excluded > 0 {
        info!("Skipping {excluded} excluded file(s)");
    }
    for file in job.included() {
        let table = file.table();
        if let Some(comment) = &file.comment {
            info!("{table}: {comment}");
        }
        let meta_path = args
            .meta_dir
            .join(format!("{}.{}.yaml", file.table_schema, file.table_name));
        let meta = TableMeta::load(&meta_path)
            .with_context(|| format!("Loading table meta from {meta_path:?}"))?;
        let source = file.resolved_source(job.csv_dir.as_deref());
        let options = ImportOptions {
            delimiter: file.delimiter_byte()?,
            batch_size: job.batch_size,
            mode: ExecutionMode::ScriptOnly,
            quoting: script_quoting(args.double_quotes),
            encoding,
            ..ImportOptions::default()
        };
        let mut engine = ImportEngine::new(NoStore, options);
        let report = engine
            .import_path_with_schema(&source, &table, &meta.columns)
            .with_context(|| format!("Converting {source:?}"))?;
        if file.truncate {
            warn!("{table}: truncate is requested by the job file; script output does not include it");
        }
        let script_path = args
            .scripts_dir
            .join(format!("{}.{}.sql", file.table_schema, file.table_name));
        io_utils::write_script(&script_path, &report.statements)
            .with_context(|| format!("Writing script to {script_path:?}"))?;
        info!(
            "{table}: {} statement(s) -> {script_path:?} ({} row(s) skipped)",
            report.statements.len(),
            report.rows_skipped
        );
    }
    Ok(())
}

fn handle_columns(args: &ColumnsArgs) -> Result<()> {
    let meta = TableMeta::load(&args.meta)
        .with_context(|| format!("Loading table meta from {:?}", args.meta))?;
    if meta.columns.is_empty() {
        info!("Table meta {:?} does not define any columns", args.meta);
        return Ok(());
    }
    let width = meta
        .columns
        .iter()
        .map(|col| col.name.len())
        .max()
        .unwrap_or(0)
        .max("name".len());
    println!("table: {}", meta.table());
    println!("{:>3}  {:<width$}  type", "#", "name");
    for (ix, col) in meta.columns.iter().enumerate() {
        println!("{:>3}  {:<width$}  {}", ix + 1, col.name, col.data_type);
    }
    Ok(())
}

fn handle_check(args: &cli::CheckArgs) -> Result<()> {
    let job = JobFile::load(&args.config)
        .with_context(|| format!("Loading job file from {:?}", args.config))?;
    println!(
        "database: {} on {} ({})",
        job.database.database,
        job.database.server,
        if job.database.trusted {
            "trusted"
        } else {
            "credentialed"
        }
    );
    println!("batch size: {}", job.batch_size);
    for file in &job.files {
        let mut flags = Vec::new();
        if !file.include {
            flags.push("excluded");
        }
        if file.truncate {
            flags.push("truncate");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {} -> {} (delimiter '{}'){flags}",
            file.source.display(),
            file.table(),
            file.delimiter
        );
    }
    info!(
        "Job file {:?} is valid: {} file(s), {} included",
        args.config,
        job.files.len(),
        job.included().count()
    );
    Ok(())
}

fn script_coercion(keep_sentinels: bool) -> CoercionPolicy {
    if keep_sentinels {
        CoercionPolicy::whitespace_only()
    } else {
        CoercionPolicy::default()
    }
}

fn script_quoting(double_quotes: bool) -> IdentifierQuoting {
    if double_quotes {
        IdentifierQuoting::double_quotes()
    } else {
        IdentifierQuoting::brackets()
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
