//! Canned scans that gather email bodies into text files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::QueryConfig;
use crate::error::{MailKvError, Result};
use crate::model::column::ColumnKey;
use crate::store::table::{Scan, Table};

/// A scan plus the families whose bodies it collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub scan: Scan,
    /// Families read from each row, in this order.
    pub families: Vec<String>,
    pub output: PathBuf,
}

/// What a query produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub name: String,
    /// Rows that held at least one requested body.
    pub rows: usize,
    /// Bodies appended to `text`.
    pub bodies: usize,
    pub text: String,
    /// File the text was (or will be) written to.
    pub output: PathBuf,
}

impl Query {
    /// Build a query from config, resolving a relative output against `output_dir`.
    pub fn from_config(cfg: &QueryConfig, output_dir: &Path) -> Self {
        let columns = cfg.families.iter().map(|f| ColumnKey::body(f)).collect();
        let scan = Scan {
            start: cfg.start.as_ref().map(|s| s.as_bytes().to_vec()),
            stop: cfg.stop.as_ref().map(|s| s.as_bytes().to_vec()),
            prefix: cfg.prefix.as_ref().map(|s| s.as_bytes().to_vec()),
            columns: Some(columns),
        };
        Self {
            name: cfg.name.clone(),
            scan,
            families: cfg.families.clone(),
            output: output_dir.join(&cfg.output),
        }
    }
}

/// Concatenate the requested bodies of every matching row, in key order.
pub fn collect_bodies<T: Table + ?Sized>(table: &T, query: &Query) -> Result<QueryResult> {
    let mut result = QueryResult {
        name: query.name.clone(),
        output: query.output.clone(),
        ..QueryResult::default()
    };

    for (_key, row) in table.scan(&query.scan)? {
        let mut matched = false;
        for family in &query.families {
            if let Some(body) = row.get(&ColumnKey::body(family)) {
                result.text.push_str(&String::from_utf8_lossy(body));
                result.bodies += 1;
                matched = true;
            }
        }
        if matched {
            result.rows += 1;
        }
    }
    Ok(result)
}

/// Run a query and write its text to the query's output file.
pub fn run_query<T: Table + ?Sized>(table: &T, query: &Query) -> Result<QueryResult> {
    let result = collect_bodies(table, query)?;
    write_output(&query.output, &result.text)?;
    info!(
        query = %query.name,
        rows = result.rows,
        bodies = result.bodies,
        path = %query.output.display(),
        "Query completed and results written to file"
    );
    Ok(result)
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MailKvError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| MailKvError::io(path, e))
}
