//! The batch: create the table, ingest every mailbox, run the canned queries.

use tracing::info;

use crate::config::Config;
use crate::error::{MailKvError, Result};
use crate::ingest::{self, IngestReport};
use crate::query::{self, Query, QueryResult};
use crate::store::catalog::Catalog;
use crate::store::memory::MemoryTable;

/// Create the configured table with one family per mailbox.
///
/// With `replace`, an existing table of the same name is dropped first;
/// otherwise it is an error.
pub fn create_table<'a>(
    catalog: &'a mut Catalog,
    config: &Config,
    replace: bool,
) -> Result<&'a mut MemoryTable> {
    if replace && catalog.delete_table(&config.store.table) {
        info!(table = %config.store.table, "Replacing existing table");
    }
    catalog.create_table(&config.store.table, config.families())
}

/// Create the table and load every configured mailbox into it.
pub fn ingest(
    catalog: &mut Catalog,
    config: &Config,
    replace: bool,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<IngestReport> {
    config.validate()?;
    let table = create_table(catalog, config, replace)?;
    ingest::ingest_mailboxes(table, &config.corpus.root, &config.corpus.mailboxes, progress)
}

/// Configured queries, optionally only the one called `only`.
pub fn queries(config: &Config, only: Option<&str>) -> Result<Vec<Query>> {
    let selected: Vec<Query> = config
        .queries
        .iter()
        .filter(|q| only.is_none_or(|name| q.name == name))
        .map(|q| Query::from_config(q, &config.output.dir))
        .collect();
    if let (Some(name), true) = (only, selected.is_empty()) {
        return Err(MailKvError::InvalidConfig(format!("no query named '{name}'")));
    }
    Ok(selected)
}

/// Run the configured queries against the table, writing each output file.
pub fn run_queries(
    catalog: &Catalog,
    config: &Config,
    only: Option<&str>,
) -> Result<Vec<QueryResult>> {
    let table = catalog.table(&config.store.table)?;
    queries(config, only)?
        .iter()
        .map(|q| query::run_query(table, q))
        .collect()
}

/// Ingest then query, as one batch.
pub fn run(
    catalog: &mut Catalog,
    config: &Config,
    replace: bool,
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<(IngestReport, Vec<QueryResult>)> {
    let report = ingest(catalog, config, replace, progress)?;
    info!(
        files = report.files(),
        rows = report.rows,
        "Ingestion finished"
    );
    let results = run_queries(catalog, config, None)?;
    Ok((report, results))
}
