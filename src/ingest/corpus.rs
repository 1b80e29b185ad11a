//! Corpus layout: numbered email files under one directory per mailbox.

use std::path::{Path, PathBuf};

use crate::config::MailboxConfig;
use crate::error::{MailKvError, Result};

/// Expand file-number specs (`"7"`, `"1-45"`) in the order given.
pub fn parse_file_ranges(specs: &[String]) -> Result<Vec<u32>> {
    let mut numbers = Vec::new();
    for spec in specs {
        let (first, last) = match spec.split_once('-') {
            Some((a, b)) => (parse_number(spec, a)?, parse_number(spec, b)?),
            None => {
                let n = parse_number(spec, spec)?;
                (n, n)
            }
        };
        if first > last {
            return Err(MailKvError::InvalidConfig(format!(
                "file range '{spec}' is inverted"
            )));
        }
        numbers.extend(first..=last);
    }
    Ok(numbers)
}

fn parse_number(spec: &str, part: &str) -> Result<u32> {
    part.trim()
        .parse()
        .map_err(|_| MailKvError::InvalidConfig(format!("bad file range '{spec}'")))
}

/// Path of email number `n` in `family`: `<root>/<family>/<n>.`
pub fn email_path(root: &Path, family: &str, n: u32) -> PathBuf {
    root.join(family).join(format!("{n}."))
}

/// All file paths of one mailbox, in configured order.
pub fn mailbox_files(root: &Path, mailbox: &MailboxConfig) -> Result<Vec<PathBuf>> {
    Ok(parse_file_ranges(&mailbox.files)?
        .into_iter()
        .map(|n| email_path(root, &mailbox.family, n))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allen_p_ranges() {
        let numbers = parse_file_ranges(&specs(&["1-45", "62-75", "78-79", "83-87"])).unwrap();
        assert_eq!(numbers.len(), 45 + 14 + 2 + 5);
        assert_eq!(numbers[0], 1);
        assert_eq!(numbers[45], 62);
        assert_eq!(*numbers.last().unwrap(), 87);
    }

    #[test]
    fn test_single_number() {
        assert_eq!(parse_file_ranges(&specs(&["78", " 79 "])).unwrap(), [78, 79]);
    }

    #[test]
    fn test_bad_ranges() {
        assert!(parse_file_ranges(&specs(&["9-3"])).is_err());
        assert!(parse_file_ranges(&specs(&["a-3"])).is_err());
        assert!(parse_file_ranges(&specs(&["-3"])).is_err());
    }

    #[test]
    fn test_email_path_has_trailing_dot() {
        let path = email_path(Path::new("/home/public/enron"), "allen-p", 12);
        assert_eq!(path, PathBuf::from("/home/public/enron/allen-p/12."));
    }
}
