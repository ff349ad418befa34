//! Session configuration for Tabstore
//!
//! Configuration comes from defaults, an optional JSON file and command
//! line flags, applied in that order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::executor::DuplicatePolicy;

/// Default workbook path
pub const DEFAULT_DATA_PATH: &str = "data.json";
/// Default log file path
pub const DEFAULT_LOG_PATH: &str = "tabstore.log";
/// Default identifier field
pub const DEFAULT_ID_FIELD: &str = "ID";

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workbook loaded at session start
    pub data_path: PathBuf,
    /// Append-only log file
    pub log_path: PathBuf,
    /// Log filter directive
    pub log_level: String,
    /// Mirror log lines to the console
    pub log_to_console: bool,
    /// Identifier field for tables without an override
    pub id_field: String,
    /// Identifier field per table
    pub table_ids: HashMap<String, String>,
    /// Duplicate identifier handling on add
    pub duplicate_ids: DuplicatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_level: "info".to_string(),
            log_to_console: false,
            id_field: DEFAULT_ID_FIELD.to_string(),
            table_ids: HashMap::new(),
            duplicate_ids: DuplicatePolicy::Allow,
        }
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::LoadError(format!("invalid config '{}': {}", path.display(), e)))
    }

    /// Set the workbook path
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Set the log file path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Set the default identifier field
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Override the identifier field of one table
    pub fn table_id(mut self, table: impl Into<String>, field: impl Into<String>) -> Self {
        self.table_ids.insert(table.into(), field.into());
        self
    }

    /// Set the duplicate identifier policy
    pub fn duplicate_ids(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_ids = policy;
        self
    }

    /// Identifier field used for `table`
    pub fn id_field_for(&self, table: &str) -> &str {
        self.table_ids
            .get(table)
            .map(String::as_str)
            .unwrap_or(&self.id_field)
    }

    /// Apply command line flags (program name excluded).
    ///
    /// `--config` replaces the whole config with the file's content before
    /// the remaining flags are applied.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| Error::InvalidCommand(format!("missing value for {}", flag)))
            };
            match flag.as_str() {
                "--config" | "-c" => self = Config::from_file(value()?)?,
                "--data" | "-d" => self.data_path = value()?.into(),
                "--log" | "-l" => self.log_path = value()?.into(),
                "--level" => self.log_level = value()?,
                "--id" => self.id_field = value()?,
                "--strict-ids" => self.duplicate_ids = DuplicatePolicy::Reject,
                "--console" => self.log_to_console = true,
                other => return Err(Error::InvalidCommand(format!("unknown flag '{}'", other))),
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.id_field, "ID");
        assert_eq!(config.duplicate_ids, DuplicatePolicy::Allow);
    }

    #[test]
    fn test_id_field_override() {
        let config = Config::new().id_field("Code").table_id("stores", "StoreID");

        assert_eq!(config.id_field_for("stores"), "StoreID");
        assert_eq!(config.id_field_for("products"), "Code");
    }

    #[test]
    fn test_apply_args() {
        let config = Config::new()
            .apply_args(&args(&["-d", "shop.tsv", "--id", "Идентификатор", "--strict-ids"]))
            .unwrap();

        assert_eq!(config.data_path, PathBuf::from("shop.tsv"));
        assert_eq!(config.id_field, "Идентификатор");
        assert_eq!(config.duplicate_ids, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_apply_args_errors() {
        assert!(matches!(
            Config::new().apply_args(&args(&["--bogus"])),
            Err(Error::InvalidCommand(_))
        ));
        assert!(matches!(
            Config::new().apply_args(&args(&["--data"])),
            Err(Error::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_partial_json_config() {
        let config: Config =
            serde_json::from_str(r#"{"id_field": "Code", "duplicate_ids": "reject"}"#).unwrap();

        assert_eq!(config.id_field, "Code");
        assert_eq!(config.duplicate_ids, DuplicatePolicy::Reject);
        assert_eq!(config.log_path, PathBuf::from(DEFAULT_LOG_PATH));
    }
}
