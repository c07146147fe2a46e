//! Error types for loading and previewing SQLite tables.

use std::io;
use std::path::PathBuf;

/// Result type alias for store and loader operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store file is missing or could not be opened.
    #[error("cannot open database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A table is not in the catalog (or vanished before it could be read).
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// A table holds more rows than the configured safeguard allows.
    #[error("table '{table}' has more than {limit} rows")]
    RowLimitExceeded { table: String, limit: usize },

    /// A text cell whose bytes are not valid UTF-8.
    #[error("column '{column}' of table '{table}' holds text that is not valid UTF-8")]
    InvalidText { table: String, column: String },

    /// A row whose width does not match the column count.
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Map a failure from preparing or stepping a statement against `table`.
    ///
    /// SQLite reports a dropped table only through its message text, so a
    /// "no such table" failure becomes a lookup error.
    pub(crate) fn from_table_read(table: &str, err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
                Error::TableNotFound(table.to_string())
            }
            _ => Error::Db(err),
        }
    }

    /// True for the lookup-error family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TableNotFound(_))
    }
}
