//! Core data model types: parsed emails, column identifiers, and rows.

pub mod column;
pub mod mail;
