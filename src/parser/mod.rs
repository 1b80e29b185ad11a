//! Email parsing: header marker location, field extraction, and row-key dates.

pub mod date;
pub mod fields;
pub mod file;
