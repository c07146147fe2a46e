use crate::error::{Error, Result};
use crate::frame::{Column, Frame};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::Utf8Error;
use tracing::{debug, info};

/// Catalog query listing every user and internal table, in creation order.
const TABLE_NAMES_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table'";

/// Core value types for SQLite cells
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Text cells must be valid UTF-8; nothing is replaced or coerced.
impl TryFrom<ValueRef<'_>> for Value {
    type Error = Utf8Error;

    fn try_from(value: ValueRef<'_>) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(std::str::from_utf8(t)?.to_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        })
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fractional part: 10.0, not 10
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(t) => f.write_str(t),
            Value::Blob(b) => write!(f, "x'{}'", hex::encode(b)),
        }
    }
}

/// Blobs serialise as a `blob` variant holding hex, so they stay distinct
/// from text. Non-finite reals follow the serializer (`null` in JSON).
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Blob(b) => {
                serializer.serialize_newtype_variant("Value", 4, "blob", &hex::encode(b))
            }
        }
    }
}

/// Column type affinity, derived from the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
    Numeric,
}

impl DataType {
    /// Apply SQLite's affinity rules (section 3.1 of the datatype docs) in order.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            DataType::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|s| upper.contains(s)) {
            DataType::Text
        } else if upper.is_empty() || upper.contains("BLOB") {
            DataType::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|s| upper.contains(s)) {
            DataType::Real
        } else {
            DataType::Numeric
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "integer",
            DataType::Text => "text",
            DataType::Real => "real",
            DataType::Blob => "blob",
            DataType::Numeric => "numeric",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
}

/// One column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// Declared type exactly as written in the schema, possibly empty.
    pub declared_type: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
    /// Default expression as SQL text.
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    fn from_row(row: &Row) -> rusqlite::Result<(Self, i64)> {
        let name: String = row.get("name")?;
        let declared_type: String = row.get("type")?;
        let not_null: bool = row.get("notnull")?;
        let pk: i64 = row.get("pk")?;

        let mut constraints = Vec::new();
        if pk > 0 {
            constraints.push(ColumnConstraint::PrimaryKey);
        }
        if not_null {
            constraints.push(ColumnConstraint::NotNull);
        }
        let column = Self {
            data_type: DataType::from_declared(&declared_type),
            name,
            declared_type,
            constraints,
            default_value: row.get("dflt_value")?,
        };
        Ok((column, pk))
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }
}

/// A catalog entry: a table name and its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    /// Primary key columns in key order.
    pub primary_key: Vec<String>,
}

impl TableDefinition {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Quote an identifier so any table name can be selected from.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Read-only handle to a file-backed SQLite store.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store at `path` read-only.
    ///
    /// A missing file, or one that is not a SQLite database, fails here with
    /// [`Error::Connection`]; the file is never created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let connection_error = |source| Error::Connection {
            path: path.to_path_buf(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(connection_error)?;
        // SQLite defers reading the header, so force it now.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(connection_error)?;

        info!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    /// Wrap an existing connection, e.g. one built by a test fixture.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open an empty in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn as_conn(&self) -> &Connection {
        &self.conn
    }

    /// Table names from the catalog, in enumeration order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(TABLE_NAMES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = names.len(), "read table catalog");
        Ok(names)
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Column definitions of one table.
    pub fn describe_table(&self, name: &str) -> Result<TableDefinition> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let entries = stmt
            .query_map([name], ColumnDefinition::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        // Every table has at least one column, so no rows means no table.
        if entries.is_empty() {
            return Err(Error::TableNotFound(name.to_string()));
        }

        let mut keyed: Vec<(i64, String)> = entries
            .iter()
            .filter(|(_, pk)| *pk > 0)
            .map(|(c, pk)| (*pk, c.name.clone()))
            .collect();
        keyed.sort_by_key(|(pk, _)| *pk);

        Ok(TableDefinition {
            name: name.to_string(),
            columns: entries.into_iter().map(|(c, _)| c).collect(),
            primary_key: keyed.into_iter().map(|(_, n)| n).collect(),
        })
    }

    /// Every table in the catalog with its columns.
    pub fn catalog(&self) -> Result<Vec<TableDefinition>> {
        self.table_names()?
            .iter()
            .map(|name| self.describe_table(name))
            .collect()
    }

    pub fn row_count(&self, name: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(name));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::from_table_read(name, e))?;
        let count: i64 = stmt
            .query_row([], |row| row.get(0))
            .map_err(|e| Error::from_table_read(name, e))?;
        Ok(count as u64)
    }

    /// Run `SELECT *` against `name` and materialise every row.
    ///
    /// With `max_rows` set, a table with more rows than the limit fails with
    /// [`Error::RowLimitExceeded`] as soon as the extra row is seen.
    pub fn select_all(&self, name: &str, max_rows: Option<usize>) -> Result<Frame> {
        let sql = format!("SELECT * FROM {}", quote_identifier(name));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::from_table_read(name, e))?;

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let definition = self.describe_table(name)?;
        let columns: Vec<Column> = names
            .into_iter()
            .map(|n| {
                let data_type = definition
                    .column(&n)
                    .map_or(DataType::Blob, |c| c.data_type);
                Column::new(n, data_type)
            })
            .collect();
        let width = columns.len();
        let invalid_text = |column: usize| Error::InvalidText {
            table: name.to_string(),
            column: columns[column].name.clone(),
        };

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(|e| Error::from_table_read(name, e))?;
        while let Some(row) = cursor.next().map_err(|e| Error::from_table_read(name, e))? {
            if let Some(limit) = max_rows {
                if rows.len() == limit {
                    return Err(Error::RowLimitExceeded {
                        table: name.to_string(),
                        limit,
                    });
                }
            }
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                let value = Value::try_from(row.get_ref(i)?).map_err(|_| invalid_text(i))?;
                values.push(value);
            }
            rows.push(values);
        }

        Frame::new(columns, rows)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Db(e))?;
        debug!("closed database");
        Ok(())
    }
}
