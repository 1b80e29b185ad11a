//! CLI entry point for `mailkv`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};

use mailkv::config::{self, Config};
use mailkv::ingest::IngestReport;
use mailkv::model::column::ColumnKey;
use mailkv::parser::file::parse_email_file;
use mailkv::pipeline;
use mailkv::query::QueryResult;
use mailkv::store::{snapshot, Catalog, Scan, Table};

#[derive(Parser)]
#[command(
    name = "mailkv",
    version,
    about = "Load Enron-style emails into a column-family table and query it by date"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the table, ingest every mailbox, and run every query (default)
    Run {
        /// Also save the table to the snapshot file
        #[arg(long)]
        save: bool,
    },
    /// Ingest every mailbox and save the table to the snapshot file
    Ingest {
        /// Replace the table if the snapshot already has it
        #[arg(short, long)]
        force: bool,
    },
    /// Run queries against the saved snapshot
    Query {
        /// Only run the query with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Scan the saved table and print matching rows
    Scan {
        /// First row key (inclusive)
        #[arg(long)]
        start: Option<String>,
        /// Last row key (exclusive)
        #[arg(long)]
        stop: Option<String>,
        /// Row key prefix
        #[arg(long, conflicts_with_all = ["start", "stop"])]
        prefix: Option<String>,
        /// Restrict to a column, as family:qualifier (repeatable)
        #[arg(long = "column", value_name = "FAMILY:QUALIFIER")]
        columns: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the fields extracted from one email file
    Parse {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config()?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command.unwrap_or(Commands::Run { save: false }) {
        Commands::Run { save } => cmd_run(&config, save),
        Commands::Ingest { force } => cmd_ingest(&config, force),
        Commands::Query { name } => cmd_query(&config, name.as_deref()),
        Commands::Scan {
            start,
            stop,
            prefix,
            columns,
            json,
        } => cmd_scan(&config, start, stop, prefix, &columns, json),
        Commands::Parse { path, json } => cmd_parse(&path, json),
        Commands::Config => cmd_config(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailkv.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn ingest_progress_bar(config: &Config) -> anyhow::Result<ProgressBar> {
    let mut total = 0u64;
    for mailbox in &config.corpus.mailboxes {
        total += mailkv::ingest::corpus::parse_file_ranges(&mailbox.files)?.len() as u64;
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Ingesting [{bar:40.cyan/blue}] {pos}/{len} emails")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Ingest and query in one pass, as a batch.
fn cmd_run(config: &Config, save: bool) -> anyhow::Result<()> {
    let snapshot_path = config::snapshot_path(config);
    let mut catalog = if save {
        snapshot::load(&snapshot_path)?.unwrap_or_default()
    } else {
        Catalog::new()
    };

    let pb = ingest_progress_bar(config)?;
    let start = Instant::now();
    let (report, results) = pipeline::run(
        &mut catalog,
        config,
        save,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();

    print_ingest_report(&report, start.elapsed());
    print_query_results(&results);

    if save {
        snapshot::save(&catalog, &snapshot_path)?;
        println!("  Snapshot saved to {}", snapshot_path.display());
    }
    Ok(())
}

/// Ingest into the snapshot.
fn cmd_ingest(config: &Config, force: bool) -> anyhow::Result<()> {
    let snapshot_path = config::snapshot_path(config);
    let mut catalog = snapshot::load(&snapshot_path)?.unwrap_or_default();

    let pb = ingest_progress_bar(config)?;
    let start = Instant::now();
    let report = pipeline::ingest(
        &mut catalog,
        config,
        force,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    )?;
    pb.finish_and_clear();

    snapshot::save(&catalog, &snapshot_path)?;
    print_ingest_report(&report, start.elapsed());
    println!(
        "  Snapshot saved to {} (tables: {})",
        snapshot_path.display(),
        catalog.table_names().join(", ")
    );
    Ok(())
}

fn load_snapshot(config: &Config) -> anyhow::Result<Catalog> {
    let path = config::snapshot_path(config);
    match snapshot::load(&path)? {
        Some(catalog) => Ok(catalog),
        None => anyhow::bail!(
            "No snapshot at {}. Run `mailkv ingest` first.",
            path.display()
        ),
    }
}

/// Run the configured queries against the snapshot.
fn cmd_query(config: &Config, name: Option<&str>) -> anyhow::Result<()> {
    let catalog = load_snapshot(config)?;
    let results = pipeline::run_queries(&catalog, config, name)?;
    print_query_results(&results);
    Ok(())
}

/// Ad-hoc scan of the snapshot.
fn cmd_scan(
    config: &Config,
    start: Option<String>,
    stop: Option<String>,
    prefix: Option<String>,
    columns: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let catalog = load_snapshot(config)?;
    let table = catalog.table(&config.store.table)?;

    let columns = columns
        .iter()
        .map(|c| c.parse::<ColumnKey>())
        .collect::<Result<Vec<_>, _>>()?;
    let scan = Scan {
        start: start.map(String::into_bytes),
        stop: stop.map(String::into_bytes),
        prefix: prefix.map(String::into_bytes),
        columns: (!columns.is_empty()).then_some(columns),
    };
    let rows = table.scan(&scan)?;

    if json {
        let items: Vec<serde_json::Value> = rows
            .iter()
            .map(|(key, row)| {
                let cells: serde_json::Map<String, serde_json::Value> = row
                    .iter()
                    .map(|(col, value)| {
                        (
                            col.to_string(),
                            serde_json::Value::String(String::from_utf8_lossy(value).into_owned()),
                        )
                    })
                    .collect();
                serde_json::json!({
                    "key": String::from_utf8_lossy(key),
                    "cells": cells,
                })
            })
            .collect();
        let output = serde_json::json!({
            "table": table.name(),
            "row_count": rows.len(),
            "rows": items,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {} row(s) in {}", rows.len(), table.name());
    println!();
    for (key, row) in &rows {
        println!("  {}", String::from_utf8_lossy(key));
        for (col, value) in row {
            println!(
                "      {:<24} {:>10}",
                col.to_string(),
                format_size(value.len(), BINARY)
            );
        }
    }
    println!();
    Ok(())
}

/// Print the extracted fields of one email file.
fn cmd_parse(path: &Path, json: bool) -> anyhow::Result<()> {
    let email = parse_email_file(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&email)?);
        return Ok(());
    }
    println!();
    println!("  {:<12} {}", "Row key", email.date);
    println!("  {:<12} {}", "Sender", email.sender);
    println!("  {:<12} {}", "Recipients", email.recipients.trim());
    println!(
        "  {:<12} {} lines, {}",
        "Body",
        email.body.lines().count(),
        format_size(email.body.len(), BINARY)
    );
    println!();
    Ok(())
}

fn cmd_config(config: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailkv", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn print_ingest_report(report: &IngestReport, elapsed: std::time::Duration) {
    println!();
    for mailbox in &report.mailboxes {
        println!(
            "  {:<20} {:>5} email(s)  {:>10}",
            mailbox.family,
            mailbox.files,
            format_size(mailbox.bytes, BINARY)
        );
    }
    println!(
        "  {:<20} {:>5} email(s)  {:>10}",
        "Total",
        report.files(),
        format_size(report.bytes(), BINARY)
    );
    println!("  {:<20} {:>5}", "Distinct rows", report.rows);
    println!("  {:<20} {:.2?}", "Ingest time", elapsed);
    println!();
}

fn print_query_results(results: &[QueryResult]) {
    for result in results {
        println!(
            "  {:<24} {:>4} row(s) {:>10}  → {}",
            result.name,
            result.rows,
            format_size(result.text.len(), BINARY),
            result.output.display()
        );
    }
    println!();
}
