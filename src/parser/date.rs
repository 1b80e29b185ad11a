//! Normalization of `Date:` header lines into sortable row keys.

use chrono::NaiveDateTime;

use crate::error::{MailKvError, Result};
use crate::model::mail::ROW_KEY_LEN;

/// Width of the timezone suffix trailing every corpus date, e.g. `" -0800 (PST)"`.
///
/// The suffix is cut by width, not by content: a date with a differently
/// sized zone token will not parse.
pub const TIMEZONE_SUFFIX_WIDTH: usize = 12;

/// Layout of the date once the weekday and zone are removed (`31 Dec 2001 02:24:51`).
const HEADER_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Layout of row keys (`20011231022451`).
const ROW_KEY_FORMAT: &str = "%Y%m%d%H%M%S";

/// Turn a full `Date:` line into a 14-digit row key.
///
/// `"Date: Mon, 31 Dec 2001 02:24:51 -0800 (PST)"` → `"20011231022451"`.
///
/// The second comma-separated segment is trimmed, the fixed-width zone
/// suffix dropped, and the remainder parsed as `DD Mon YYYY HH:MM:SS`.
pub fn row_key_from_date_line(line: &str) -> Result<String> {
    let segment = line
        .split(',')
        .nth(1)
        .ok_or_else(|| invalid(line, "no comma after the weekday"))?
        .trim();

    let chars = segment.chars().count();
    if chars <= TIMEZONE_SUFFIX_WIDTH {
        return Err(invalid(line, "date shorter than the timezone suffix"));
    }
    let cut = segment
        .char_indices()
        .nth(chars - TIMEZONE_SUFFIX_WIDTH)
        .map_or(segment.len(), |(i, _)| i);

    format_row_key(&segment[..cut]).map_err(|reason| invalid(line, &reason))
}

/// Reformat a `DD Mon YYYY HH:MM:SS` timestamp as `YYYYMMDDHHMMSS`.
pub fn format_row_key(stamp: &str) -> std::result::Result<String, String> {
    let dt = NaiveDateTime::parse_from_str(stamp, HEADER_DATE_FORMAT)
        .map_err(|e| format!("'{stamp}': {e}"))?;
    let key = dt.format(ROW_KEY_FORMAT).to_string();
    if !is_row_key(&key) {
        return Err(format!("'{key}' is not a {ROW_KEY_LEN}-digit key"));
    }
    Ok(key)
}

/// Whether `key` is exactly 14 ASCII digits.
pub fn is_row_key(key: &str) -> bool {
    key.len() == ROW_KEY_LEN && key.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(line: &str, reason: &str) -> MailKvError {
    MailKvError::InvalidDate {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}
