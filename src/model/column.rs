//! Column identifiers (`family:qualifier`) and row cell maps.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MailKvError;

/// Qualifier holding the email body.
pub const BODY: &str = "body";
/// Qualifier holding the sender address.
pub const SENDER: &str = "sender";
/// Qualifier holding the raw recipient text.
pub const SENDEE: &str = "sendee";

/// A column inside a column family.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub family: String,
    pub qualifier: String,
}

impl ColumnKey {
    pub fn new(family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }

    /// The `body` column of a family.
    pub fn body(family: &str) -> Self {
        Self::new(family, BODY)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.qualifier)
    }
}

impl FromStr for ColumnKey {
    type Err = MailKvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((family, qualifier)) if !family.is_empty() && !qualifier.is_empty() => {
                Ok(Self::new(family, qualifier))
            }
            _ => Err(MailKvError::InvalidColumn(s.to_string())),
        }
    }
}

/// Cells of one row, ordered by column.
pub type Row = BTreeMap<ColumnKey, Vec<u8>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_key() {
        let key: ColumnKey = "allen-p:body".parse().unwrap();
        assert_eq!(key.family, "allen-p");
        assert_eq!(key.qualifier, "body");
        assert_eq!(key.to_string(), "allen-p:body");
    }

    #[test]
    fn test_qualifier_may_contain_colon() {
        let key: ColumnKey = "fam:a:b".parse().unwrap();
        assert_eq!(key.family, "fam");
        assert_eq!(key.qualifier, "a:b");
    }

    #[test]
    fn test_reject_malformed_column_key() {
        assert!("nocolon".parse::<ColumnKey>().is_err());
        assert!(":body".parse::<ColumnKey>().is_err());
        assert!("fam:".parse::<ColumnKey>().is_err());
    }
}
