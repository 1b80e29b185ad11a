//! Reading and parsing individual email files from disk.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{MailKvError, Result};
use crate::model::mail::ParsedEmail;
use crate::parser::fields;

/// Read and parse one email file.
pub fn parse_email_file(path: impl AsRef<Path>) -> Result<ParsedEmail> {
    let path = path.as_ref();
    let text = read_email_text(path)?;
    parse_email_text(&text, path)
}

/// Parse email text already in memory. `origin` is only used in errors.
pub fn parse_email_text(text: &str, origin: &Path) -> Result<ParsedEmail> {
    let lines = split_lines(text);
    let index = fields::locate_fields(&lines).map_err(|marker| MailKvError::MissingMarker {
        path: origin.to_path_buf(),
        marker: marker.as_str(),
    })?;
    debug!(path = %origin.display(), ?index, "Located header markers");
    fields::extract_fields(&lines, &index)
}

/// Split text into lines the way the corpus tooling does.
///
/// `\r\n`, a bare `\r` and `\n` all end a line, as do the ASCII and Unicode
/// separators `\x0b`, `\x0c`, `\x1c`-`\x1e`, `\u{85}`, `\u{2028}` and
/// `\u{2029}`. A trailing terminator does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Read a file as text.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn read_email_text(path: &Path) -> Result<String> {
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailKvError::FileNotFound(path.to_path_buf())
        } else {
            MailKvError::io(path, e)
        }
    })?;
    Ok(decode_text(&data, path))
}

fn decode_text(bytes: &[u8], path: &Path) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!(path = %path.display(), "File is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
