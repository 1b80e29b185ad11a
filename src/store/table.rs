//! The table abstraction that ingestion and queries are written against.

use crate::error::{MailKvError, Result};
use crate::model::column::{ColumnKey, Row};

/// Row selection for [`Table::scan`].
///
/// `start` is inclusive and `stop` exclusive. `prefix` selects keys that
/// begin with it and cannot be combined with `start`/`stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub start: Option<Vec<u8>>,
    pub stop: Option<Vec<u8>>,
    pub prefix: Option<Vec<u8>>,
    /// Only return these columns. Rows without any of them are skipped.
    pub columns: Option<Vec<ColumnKey>>,
}

impl Scan {
    /// Scan every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Scan `[start, stop)`.
    pub fn range(start: impl Into<Vec<u8>>, stop: impl Into<Vec<u8>>) -> Self {
        Self {
            start: Some(start.into()),
            stop: Some(stop.into()),
            ..Self::default()
        }
    }

    /// Scan keys starting with `prefix`.
    pub fn prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Restrict the returned cells to `columns`.
    pub fn with_columns(mut self, columns: Vec<ColumnKey>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Reject option combinations that have no meaning.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_some() && (self.start.is_some() || self.stop.is_some()) {
            return Err(MailKvError::InvalidScan(
                "prefix cannot be combined with start or stop".into(),
            ));
        }
        Ok(())
    }

    /// Whether `key` falls inside this scan's row selection.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        if let Some(prefix) = &self.prefix {
            return key.starts_with(prefix);
        }
        if let Some(start) = &self.start {
            if key < start.as_slice() {
                return false;
            }
        }
        if let Some(stop) = &self.stop {
            if key >= stop.as_slice() {
                return false;
            }
        }
        true
    }

    /// Keep only the requested columns of a row.
    ///
    /// Returns `None` when no requested column is present.
    pub fn project(&self, row: &Row) -> Option<Row> {
        let projected: Row = match &self.columns {
            None => row.clone(),
            Some(columns) => row
                .iter()
                .filter(|(k, _)| columns.contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        (!projected.is_empty()).then_some(projected)
    }
}

/// A column-family table with rows ordered by key bytes.
pub trait Table {
    /// Table name.
    fn name(&self) -> &str;

    /// Declared column families.
    fn families(&self) -> &[String];

    /// Write cells into a row, creating it if needed. Cells already in the
    /// row under other columns are kept.
    fn put(&mut self, row_key: &[u8], columns: Row) -> Result<()>;

    /// Fetch one row.
    fn row(&self, row_key: &[u8]) -> Option<&Row>;

    /// Rows matching `scan`, in ascending key order.
    fn scan(&self, scan: &Scan) -> Result<Vec<(Vec<u8>, Row)>>;

    /// Number of rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
