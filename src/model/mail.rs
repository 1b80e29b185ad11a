//! Parsed email record and the per-file marker index.

use serde::{Deserialize, Serialize};

/// Length of a normalized row key (`YYYYMMDDHHMMSS`).
pub const ROW_KEY_LEN: usize = 14;

/// Fields extracted from one email file.
///
/// Built fresh for every file, written to the table, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    /// Normalized `YYYYMMDDHHMMSS` timestamp, used as the row key.
    pub date: String,

    /// Sender address from the `From:` line.
    pub sender: String,

    /// Raw recipient text: every line from `To:` up to `Subject:`, joined
    /// without a separator. Empty when there is no `To:` header.
    pub recipients: String,

    /// Every line after `X-FileName:`, joined with `\n`.
    pub body: String,
}

impl ParsedEmail {
    /// Row key bytes for this record.
    pub fn row_key(&self) -> &[u8] {
        self.date.as_bytes()
    }
}

/// Zero-based line numbers of the header markers in one file.
///
/// Only the first line containing each marker counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIndex {
    /// Line containing `Date:`.
    pub date: usize,
    /// Line containing `From:`.
    pub sender: usize,
    /// Line containing `To:`, if any.
    pub sendee: Option<usize>,
    /// Line containing `Subject:`; recipients end just before it.
    pub sendee_end: usize,
    /// First body line (the line after `X-FileName:`).
    pub body: usize,
}
