//! Loads whole tables from a [`Store`] into memory.

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::sqlite::Store;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

/// Every table of a store, keyed by name in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMap {
    entries: Vec<(String, Frame)>,
}

impl TableMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Frame> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, frame)| frame)
    }

    /// Like [`TableMap::get`], but a missing key is a lookup error.
    pub fn frame(&self, name: &str) -> Result<&Frame> {
        self.get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// The first `rows` rows of table `name`.
    pub fn preview(&self, name: &str, rows: usize) -> Result<Frame> {
        Ok(self.frame(name)?.head(rows))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Frame)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f))
    }
}

impl Serialize for TableMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, frame) in &self.entries {
            map.serialize_entry(name, frame)?;
        }
        map.end()
    }
}

/// Table loader with an optional per-table row safeguard.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    max_rows: Option<usize>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to materialise any table with more than `limit` rows.
    pub fn with_max_rows(mut self, limit: Option<usize>) -> Self {
        self.max_rows = limit;
        self
    }

    pub fn load_table(&self, store: &Store, name: &str) -> Result<Frame> {
        let frame = store.select_all(name, self.max_rows).map_err(|e| {
            if let Error::RowLimitExceeded { table, limit } = &e {
                warn!(%table, limit, "row limit exceeded");
            }
            e
        })?;
        let (rows, columns) = frame.shape();
        debug!(table = name, rows, columns, "loaded table");
        Ok(frame)
    }

    /// Load every catalog table. The first failure aborts the whole load.
    pub fn load_all(&self, store: &Store) -> Result<TableMap> {
        let names = store.table_names()?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let frame = self.load_table(store, &name)?;
            entries.push((name, frame));
        }

        let total_rows: usize = entries.iter().map(|(_, f)| f.shape().0).sum();
        info!(tables = entries.len(), total_rows, "loaded all tables");
        Ok(TableMap { entries })
    }
}

/// Load every table in `store` with no row limit.
pub fn load_all_tables(store: &Store) -> Result<TableMap> {
    Loader::new().load_all(store)
}

/// Load one table by name with no row limit.
pub fn load_table(store: &Store, name: &str) -> Result<Frame> {
    Loader::new().load_table(store, name)
}
