//! Loading email files into a table, one column family per mailbox.

pub mod corpus;

use std::path::Path;

use tracing::info;

use crate::config::MailboxConfig;
use crate::error::Result;
use crate::model::column::{ColumnKey, Row, BODY, SENDEE, SENDER};
use crate::model::mail::ParsedEmail;
use crate::parser::file::parse_email_file;
use crate::store::table::Table;

/// Totals for one ingested mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxReport {
    pub family: String,
    pub files: usize,
    /// Sum of body, sender, and recipient bytes written.
    pub bytes: u64,
}

/// Totals for a whole ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub mailboxes: Vec<MailboxReport>,
    /// Distinct row keys in the table afterwards.
    pub rows: usize,
}

impl IngestReport {
    pub fn files(&self) -> usize {
        self.mailboxes.iter().map(|m| m.files).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.mailboxes.iter().map(|m| m.bytes).sum()
    }
}

/// The `body`, `sender`, and `sendee` cells of an email under `family`.
pub fn email_columns(family: &str, email: &ParsedEmail) -> Row {
    let mut row = Row::new();
    row.insert(ColumnKey::new(family, BODY), email.body.as_bytes().to_vec());
    row.insert(
        ColumnKey::new(family, SENDER),
        email.sender.as_bytes().to_vec(),
    );
    row.insert(
        ColumnKey::new(family, SENDEE),
        email.recipients.as_bytes().to_vec(),
    );
    row
}

/// Parse one file and write it under its date row key.
pub fn ingest_file<T: Table + ?Sized>(
    table: &mut T,
    family: &str,
    path: &Path,
) -> Result<ParsedEmail> {
    let email = parse_email_file(path)?;
    table.put(email.row_key(), email_columns(family, &email))?;
    info!(path = %path.display(), family, row = %email.date, "Email ingested");
    Ok(email)
}

/// Ingest every configured mailbox in order.
///
/// The first failing file aborts the run; rows already written stay in the table.
pub fn ingest_mailboxes<T: Table + ?Sized>(
    table: &mut T,
    root: &Path,
    mailboxes: &[MailboxConfig],
    progress: Option<&dyn Fn(u64, u64)>,
) -> Result<IngestReport> {
    let mut plan = Vec::with_capacity(mailboxes.len());
    for mailbox in mailboxes {
        plan.push((
            mailbox.family.as_str(),
            corpus::mailbox_files(root, mailbox)?,
        ));
    }
    let total: u64 = plan.iter().map(|(_, files)| files.len() as u64).sum();

    let mut report = IngestReport::default();
    let mut done: u64 = 0;
    for (family, files) in plan {
        let mut mailbox = MailboxReport {
            family: family.to_string(),
            ..MailboxReport::default()
        };
        for path in &files {
            let email = ingest_file(table, family, path)?;
            mailbox.files += 1;
            mailbox.bytes +=
                (email.body.len() + email.sender.len() + email.recipients.len()) as u64;
            done += 1;
            if let Some(cb) = progress {
                cb(done, total);
            }
        }
        info!(family, files = mailbox.files, "Mailbox ingested");
        report.mailboxes.push(mailbox);
    }

    report.rows = table.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTable;

    fn email() -> ParsedEmail {
        ParsedEmail {
            date: "20011231022451".into(),
            sender: "a@enron.com".into(),
            recipients: " b@enron.com".into(),
            body: "hello".into(),
        }
    }

    #[test]
    fn test_email_columns() {
        let row = email_columns("allen-p", &email());
        assert_eq!(row.len(), 3);
        assert_eq!(row[&ColumnKey::new("allen-p", "sender")], b"a@enron.com");
        assert_eq!(row[&ColumnKey::new("allen-p", "sendee")], b" b@enron.com");
        assert_eq!(row[&ColumnKey::body("allen-p")], b"hello");
    }

    #[test]
    fn test_missing_file_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let mut table = MemoryTable::new("t", vec!["allen-p".into()]);
        let mailboxes = vec![MailboxConfig {
            family: "allen-p".into(),
            files: vec!["1".into()],
        }];
        assert!(ingest_mailboxes(&mut table, tmp.path(), &mailboxes, None).is_err());
        assert!(table.is_empty());
    }
}
