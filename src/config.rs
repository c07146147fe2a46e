//! Run configuration: command-line values layered over an optional TOML file.

use crate::error::{Error, Result};
use crate::frame::DEFAULT_PREVIEW_ROWS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Table previewed when none is named.
pub const DEFAULT_TABLE: &str = "sales_data";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub table: Option<String>,
    pub rows: Option<usize>,
    pub max_rows: Option<usize>,
    pub format: Option<OutputFormat>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub table: Option<String>,
    pub rows: Option<usize>,
    pub max_rows: Option<usize>,
    pub format: Option<OutputFormat>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub table: String,
    pub rows: usize,
    pub max_rows: Option<usize>,
    pub format: OutputFormat,
}

impl Config {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            table: DEFAULT_TABLE.to_string(),
            rows: DEFAULT_PREVIEW_ROWS,
            max_rows: None,
            format: OutputFormat::default(),
        }
    }

    /// Layer command-line values over file values over built-in defaults.
    ///
    /// There is no default database path: one must come from either layer.
    pub fn resolve(file: FileConfig, cli: Overrides) -> Result<Self> {
        let db_path = cli
            .db_path
            .or(file.db_path)
            .ok_or_else(|| Error::Config("no database path given".to_string()))?;

        let mut config = Self::new(db_path);
        if let Some(table) = cli.table.or(file.table) {
            config.table = table;
        }
        if let Some(rows) = cli.rows.or(file.rows) {
            config.rows = rows;
        }
        config.max_rows = cli.max_rows.or(file.max_rows);
        if let Some(format) = cli.format.or(file.format) {
            config.format = format;
        }

        if config.max_rows == Some(0) {
            return Err(Error::Config("max_rows must be at least 1".to_string()));
        }
        Ok(config)
    }
}
