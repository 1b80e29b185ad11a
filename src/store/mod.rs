//! Column-family table storage: the `Table` trait, an in-memory table,
//! the table catalog, and snapshot persistence.

pub mod catalog;
pub mod memory;
pub mod snapshot;
pub mod table;

pub use catalog::Catalog;
pub use memory::MemoryTable;
pub use table::{Scan, Table};
