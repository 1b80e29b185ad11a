//! `mailkv` — load Enron-style email files into a column-family table keyed
//! by sortable timestamps, and answer range and prefix queries over it.
//!
//! The crate is split into header parsing ([`parser`]), the table store
//! ([`store`]), mailbox ingestion ([`ingest`]), body-collecting queries
//! ([`query`]), and the batch that ties them together ([`pipeline`]).

pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod store;
