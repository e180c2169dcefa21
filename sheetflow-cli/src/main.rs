//! sheetflow command line.
//!
//! Usage:
//!   sheetflow import --job job.toml people.csv
//!   sheetflow rules --job job.toml
//!   sheetflow template --job job.toml --out people-template.csv
//!   sheetflow export --db people.db --table people --out people.csv

mod config;
mod jsonl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sheetflow_import::{import, ImportJob, Notification, SqliteSink};
use sheetflow_io::{export_records, export_template};
use sheetflow_rules::describe_rules;

use crate::config::{constant_columns, JobFile};
use crate::jsonl::JsonlSink;

#[derive(Parser, Debug)]
#[command(name = "sheetflow", version)]
#[command(about = "Validate and import CSV/spreadsheet files in batches")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a file using a job definition
    Import {
        /// Job definition (TOML)
        #[arg(long)]
        job: PathBuf,
        /// File to import (.csv, .tsv, .xlsx, .xls, .ods, ...)
        file: PathBuf,
        /// Overrides the job's batch size
        #[arg(long)]
        batch_size: Option<usize>,
        /// Validate only; ignore the job's sink
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the job's rules in plain words
    Rules {
        #[arg(long)]
        job: PathBuf,
    },
    /// Write an empty file with the columns the job validates
    Template {
        #[arg(long)]
        job: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Export an imported SQLite table to a delimited file
    Export {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        table: String,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Import {
            job,
            file,
            batch_size,
            dry_run,
        } => run_import(&job, &file, batch_size, dry_run),
        Command::Rules { job } => {
            let job = JobFile::load(&job)?;
            println!("{}", describe_rules(&job.rules));
            Ok(ExitCode::SUCCESS)
        }
        Command::Template { job, out } => {
            let job = JobFile::load(&job)?;
            let columns: Vec<&str> = job.rules.columns().collect();
            let summary = export_template(columns.as_slice(), &out)
                .with_context(|| format!("Failed to write template {}", out.display()))?;
            println!("Wrote {} column(s) to {}", summary.columns.len(), summary.path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Export { db, table, out } => {
            let sink = SqliteSink::open_read_only(&db, table.as_str())
                .with_context(|| format!("Failed to open database {}", db.display()))?;
            let records = sink
                .rows()
                .with_context(|| format!("Failed to read table {table}"))?;
            let summary = export_records(records, &out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Exported {} row(s) to {}", summary.rows, summary.path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_import(
    job_path: &Path,
    file: &Path,
    batch_size: Option<usize>,
    dry_run: bool,
) -> Result<ExitCode> {
    let JobFile {
        batch_size: configured,
        reader,
        rules,
        messages,
        attributes,
        add_columns,
        sink,
    } = JobFile::load(job_path)?;

    let mut builder = ImportJob::builder()
        .batch_size(batch_size.unwrap_or(configured))
        .rules(rules)
        .messages(messages)
        .attributes(attributes)
        .reader_options(reader.to_options()?);

    let columns = constant_columns(&add_columns)?;
    if !columns.is_empty() {
        builder = builder.augmenter(columns);
    }

    if dry_run {
        info!("Dry run: batches are validated but not stored");
    } else {
        if let (Some(database), Some(table)) = (&sink.database, &sink.table) {
            let sqlite = SqliteSink::open(database, table.as_str())
                .with_context(|| format!("Failed to open database {}", database.display()))?;
            builder = builder.transactional_sink(sqlite);
        }
        if let Some(path) = &sink.jsonl {
            let jsonl = JsonlSink::create(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            builder = builder.plain_sink(jsonl);
        }
    }

    let outcome = builder.build().and_then(|mut job| import(file, &mut job));
    let notification = Notification::from_outcome(&outcome);
    println!("{notification}");

    Ok(if notification.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
