//! Load every table of a SQLite database into memory and preview one of them.
//!
//! # Intention
//!
//! - Open a store read-only from an explicitly configured path.
//! - Materialise each catalog table as a [`Frame`] in a [`TableMap`].
//! - Render the head of one table as text or JSON.
//!
//! # Architectural Boundaries
//!
//! - Only reads. Nothing here writes to the store.
//! - Configuration and logging setup stay in the binary; the library only
//!   emits `tracing` events.

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod sqlite;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use frame::{Column, Frame, DEFAULT_PREVIEW_ROWS};
pub use loader::{load_all_tables, load_table, Loader, TableMap};
pub use sqlite::{DataType, Store, TableDefinition, Value};
