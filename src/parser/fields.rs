//! Header marker location and field extraction.
//!
//! Headers are found by substring, not by RFC 5322 parsing: the first line
//! that contains a marker anywhere wins, and later matches (quoted or
//! forwarded headers in the body) are ignored.

use crate::error::Result;
use crate::model::mail::{FieldIndex, ParsedEmail};
use crate::parser::date;

/// Header markers searched for in each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Date,
    From,
    To,
    Subject,
    FileName,
}

impl Marker {
    /// The substring that identifies this header line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "Date:",
            Self::From => "From:",
            Self::To => "To:",
            Self::Subject => "Subject:",
            Self::FileName => "X-FileName:",
        }
    }
}

/// Record the first line holding each marker.
///
/// `To:` is optional; every other marker is required and the first missing
/// one is returned as the error.
pub fn locate_fields(lines: &[&str]) -> std::result::Result<FieldIndex, Marker> {
    let mut date = None;
    let mut sender = None;
    let mut sendee = None;
    let mut sendee_end = None;
    let mut body = None;

    for (n, line) in lines.iter().enumerate() {
        if date.is_none() && line.contains(Marker::Date.as_str()) {
            date = Some(n);
        }
        if sender.is_none() && line.contains(Marker::From.as_str()) {
            sender = Some(n);
        }
        if sendee.is_none() && line.contains(Marker::To.as_str()) {
            sendee = Some(n);
        }
        if sendee_end.is_none() && line.contains(Marker::Subject.as_str()) {
            sendee_end = Some(n);
        }
        if body.is_none() && line.contains(Marker::FileName.as_str()) {
            body = Some(n + 1);
        }
    }

    Ok(FieldIndex {
        date: date.ok_or(Marker::Date)?,
        sender: sender.ok_or(Marker::From)?,
        sendee,
        sendee_end: sendee_end.ok_or(Marker::Subject)?,
        body: body.ok_or(Marker::FileName)?,
    })
}

/// Slice the fields out of `lines` using an index from [`locate_fields`]
/// over the same lines.
pub fn extract_fields(lines: &[&str], index: &FieldIndex) -> Result<ParsedEmail> {
    let date = date::row_key_from_date_line(lines[index.date])?;
    let sender = after_first_colon(lines[index.sender]).trim().to_string();

    // A `To:` found at or after `Subject:` belongs to a later header
    // (`X-To:`), so the message has no recipient block.
    let recipients = match index.sendee {
        Some(start) if start < index.sendee_end => {
            let block = &lines[start..index.sendee_end];
            let mut joined = String::from(after_first_colon(block[0]));
            for line in &block[1..] {
                joined.push_str(line);
            }
            joined
        }
        _ => String::new(),
    };

    let body = lines
        .get(index.body..)
        .map(|rest| rest.join("\n"))
        .unwrap_or_default();

    Ok(ParsedEmail {
        date,
        sender,
        recipients,
        body,
    })
}

/// Everything after the first `:`, untrimmed.
fn after_first_colon(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, rest)| rest)
}
