//! In-memory table backed by an ordered map.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MailKvError, Result};
use crate::model::column::Row;
use crate::store::table::{Scan, Table};

/// Column-family table kept entirely in memory.
///
/// Rows live in a `BTreeMap`, so scans come out in key-byte order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTable {
    name: String,
    families: Vec<String>,
    rows: BTreeMap<Vec<u8>, Row>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>, families: Vec<String>) -> Self {
        Self {
            name: name.into(),
            families,
            rows: BTreeMap::new(),
        }
    }

    /// Lower bound of the key range a scan can touch.
    fn lower_bound(scan: &Scan) -> Bound<Vec<u8>> {
        match (&scan.prefix, &scan.start) {
            (Some(prefix), _) => Bound::Included(prefix.clone()),
            (None, Some(start)) => Bound::Included(start.clone()),
            (None, None) => Bound::Unbounded,
        }
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn families(&self) -> &[String] {
        &self.families
    }

    fn put(&mut self, row_key: &[u8], columns: Row) -> Result<()> {
        if let Some(unknown) = columns
            .keys()
            .find(|c| !self.families.iter().any(|f| *f == c.family))
        {
            return Err(MailKvError::UnknownFamily {
                table: self.name.clone(),
                family: unknown.family.clone(),
            });
        }

        let row = self.rows.entry(row_key.to_vec()).or_default();
        for (column, value) in columns {
            if row.insert(column.clone(), value).is_some() {
                debug!(
                    row = %String::from_utf8_lossy(row_key),
                    column = %column,
                    "Overwrote existing cell"
                );
            }
        }
        Ok(())
    }

    fn row(&self, row_key: &[u8]) -> Option<&Row> {
        self.rows.get(row_key)
    }

    fn scan(&self, scan: &Scan) -> Result<Vec<(Vec<u8>, Row)>> {
        scan.validate()?;

        let mut result = Vec::new();
        for (key, row) in self
            .rows
            .range((Self::lower_bound(scan), Bound::Unbounded))
        {
            if !scan.contains_key(key) {
                // Keys are ordered: once past the prefix or the stop key,
                // nothing later can match.
                break;
            }
            if let Some(cells) = scan.project(row) {
                result.push((key.clone(), cells));
            }
        }
        Ok(result)
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
