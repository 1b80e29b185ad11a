//! Named tables and their lifecycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MailKvError, Result};
use crate::store::memory::MemoryTable;

/// A set of named tables, the unit that is saved to and loaded from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    tables: BTreeMap<String, MemoryTable>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given column families.
    pub fn create_table(&mut self, name: &str, families: Vec<String>) -> Result<&mut MemoryTable> {
        if self.tables.contains_key(name) {
            return Err(MailKvError::TableExists(name.to_string()));
        }
        info!(table = name, families = ?families, "Created table");
        Ok(self
            .tables
            .entry(name.to_string())
            .or_insert_with(|| MemoryTable::new(name, families)))
    }

    /// Drop a table. Returns whether it existed.
    pub fn delete_table(&mut self, name: &str) -> bool {
        let existed = self.tables.remove(name).is_some();
        if existed {
            info!(table = name, "Deleted table");
        }
        existed
    }

    pub fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| MailKvError::TableNotFound(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| MailKvError::TableNotFound(name.to_string()))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::table::Table;

    #[test]
    fn test_create_and_lookup() {
        let mut catalog = Catalog::new();
        catalog
            .create_table("lf-emails", vec!["allen-p".into()])
            .unwrap();
        let table = catalog.table("lf-emails").unwrap();
        assert_eq!(table.families(), ["allen-p".to_string()]);
        assert_eq!(catalog.table_names(), ["lf-emails"]);
    }

    #[test]
    fn test_create_twice_fails() {
        let mut catalog = Catalog::new();
        catalog.create_table("t", vec![]).unwrap();
        assert!(matches!(
            catalog.create_table("t", vec![]),
            Err(MailKvError::TableExists(_))
        ));
    }

    #[test]
    fn test_missing_table() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.table("nope"),
            Err(MailKvError::TableNotFound(_))
        ));
        assert!(!catalog.delete_table("nope"));
        catalog.create_table("nope", vec![]).unwrap();
        assert!(catalog.delete_table("nope"));
        assert!(catalog.is_empty());
    }
}
