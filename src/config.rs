//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILKV_CONFIG` (environment variable)
//! 2. `~/.config/mailkv/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailkv\config.toml` (Windows)
//! 3. Built-in defaults (the `allen-p` / `meyers-a` corpus and its three queries)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MailKvError, Result};
use crate::ingest::corpus;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Table name and snapshot location.
    pub store: StoreConfig,
    /// Where the email files live and which ones to ingest.
    pub corpus: CorpusConfig,
    /// Where query results are written.
    pub output: OutputConfig,
    /// Canned queries, run in order.
    pub queries: Vec<QueryConfig>,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Table that holds one column family per mailbox.
    pub table: String,
    /// Snapshot file. Defaults to `<data_dir>/mailkv/<table>.mailkv`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

/// Input corpus layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory containing one sub-directory per mailbox.
    pub root: PathBuf,
    /// Mailboxes to ingest, one column family each.
    pub mailboxes: Vec<MailboxConfig>,
}

/// One mailbox: its column family and the numbered files to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Column family name, also the sub-directory under the corpus root.
    pub family: String,
    /// File numbers as `"N"` or `"FIRST-LAST"` (inclusive).
    pub files: Vec<String>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that relative query outputs are resolved against.
    pub dir: PathBuf,
}

/// A canned scan whose `body` cells are written to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub name: String,
    /// Families whose bodies are collected, in this order within each row.
    pub families: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Output file, relative to `output.dir` unless absolute.
    pub output: PathBuf,
}

// ── Default implementations ─────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            corpus: CorpusConfig::default(),
            output: OutputConfig::default(),
            queries: default_queries(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: "lf-emails".to_string(),
            snapshot: None,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/home/public/enron"),
            mailboxes: vec![
                MailboxConfig {
                    family: "allen-p".to_string(),
                    files: ["1-45", "62-75", "78-79", "83-87"]
                        .map(String::from)
                        .to_vec(),
                },
                MailboxConfig {
                    family: "meyers-a".to_string(),
                    files: vec!["1-22".to_string()],
                },
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

fn default_queries() -> Vec<QueryConfig> {
    vec![
        QueryConfig {
            name: "meyers-a-range".to_string(),
            families: vec!["meyers-a".to_string()],
            start: Some("20010911101232".to_string()),
            stop: Some("20020206205713".to_string()),
            prefix: None,
            output: PathBuf::from("output1.txt"),
        },
        QueryConfig {
            name: "december-2001".to_string(),
            families: vec!["allen-p".to_string(), "meyers-a".to_string()],
            start: None,
            stop: None,
            prefix: Some("200112".to_string()),
            output: PathBuf::from("output2.txt"),
        },
        QueryConfig {
            name: "allen-p-november-2001".to_string(),
            families: vec!["allen-p".to_string()],
            start: None,
            stop: None,
            prefix: Some("200111".to_string()),
            output: PathBuf::from("output3.txt"),
        },
    ]
}

// ── Validation ──────────────────────────────────────────────────

impl Config {
    /// Column family names, in mailbox order.
    pub fn families(&self) -> Vec<String> {
        self.corpus
            .mailboxes
            .iter()
            .map(|m| m.family.clone())
            .collect()
    }

    /// Check that mailboxes and queries are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.store.table.is_empty() {
            return Err(MailKvError::InvalidConfig("store.table is empty".into()));
        }
        if self.corpus.mailboxes.is_empty() {
            return Err(MailKvError::InvalidConfig("no mailboxes configured".into()));
        }

        let mut seen = HashSet::new();
        for mailbox in &self.corpus.mailboxes {
            if mailbox.family.is_empty() || mailbox.family.contains(':') {
                return Err(MailKvError::InvalidConfig(format!(
                    "invalid family name '{}'",
                    mailbox.family
                )));
            }
            if !seen.insert(mailbox.family.as_str()) {
                return Err(MailKvError::InvalidConfig(format!(
                    "family '{}' listed twice",
                    mailbox.family
                )));
            }
            corpus::parse_file_ranges(&mailbox.files)?;
        }

        for query in &self.queries {
            if let Some(unknown) = query.families.iter().find(|f| !seen.contains(f.as_str())) {
                return Err(MailKvError::InvalidConfig(format!(
                    "query '{}' reads unknown family '{unknown}'",
                    query.name
                )));
            }
            if query.prefix.is_some() && (query.start.is_some() || query.stop.is_some()) {
                return Err(MailKvError::InvalidConfig(format!(
                    "query '{}' combines prefix with start/stop",
                    query.name
                )));
            }
        }
        Ok(())
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found. A file that exists
/// but cannot be read or parsed is an error.
pub fn load_config() -> Result<Config> {
    load_config_or_default(config_file_path().as_deref())
}

/// Load `path` if it exists, otherwise the defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => {
            let cfg = load_config_from(path)?;
            tracing::info!(path = %path.display(), "Loaded config");
            Ok(cfg)
        }
        _ => Ok(Config::default()),
    }
}

/// Read and parse one configuration file.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| MailKvError::io(path, e))?;
    toml::from_str::<Config>(&contents)
        .map_err(|e| MailKvError::InvalidConfig(format!("{}: {e}", path.display())))
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILKV_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailkv").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailkv")
}

/// Return the snapshot file path.
pub fn snapshot_path(config: &Config) -> PathBuf {
    if let Some(ref path) = config.store.snapshot {
        return path.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailkv")
        .join(format!("{}.mailkv", config.store.table))
}
