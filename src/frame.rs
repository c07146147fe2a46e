//! In-memory tabular results: named, typed columns over rows of values.

use crate::error::{Error, Result};
use crate::sqlite::{DataType, Value};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;

/// Number of rows shown by a preview when no count is given.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Rows of values under a fixed list of columns.
///
/// Every row holds exactly one value per column; [`Frame::new`] rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(Error::RaggedRow {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows; all of them when the frame is shorter.
    pub fn head(&self, n: usize) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Write the rows as pretty-printed JSON records.
    pub fn write_json<W: Write>(&self, out: W) -> Result<()> {
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty table")?;
            writeln!(f, "Columns: [{}]", self.column_names().join(", "))?;
            return write!(f, "Index: []");
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let index_width = (self.rows.len() - 1).to_string().len();

        write!(f, "{:index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {:>width$}", column.name)?;
        }
        for (i, row) in cells.iter().enumerate() {
            write!(f, "\n{i:<index_width$}")?;
            for (cell, width) in row.iter().zip(widths.iter().copied()) {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}

/// Serialises as a list of `{column: value}` records.
impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                values: row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [Column],
    values: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(&column.name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> Frame {
        Frame::new(
            vec![
                Column::new("id", DataType::Integer),
                Column::new("amount", DataType::Integer),
            ],
            vec![
                vec![Value::Integer(1), Value::Integer(10)],
                vec![Value::Integer(2), Value::Integer(20)],
                vec![Value::Integer(3), Value::Integer(30)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Frame::new(
            vec![Column::new("a", DataType::Integer)],
            vec![
                vec![Value::Integer(1)],
                vec![Value::Integer(1), Value::Integer(2)],
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedRow {
                row: 1,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_head() {
        let frame = sales();
        assert_eq!(frame.head(2).shape(), (2, 2));
        assert_eq!(frame.head(DEFAULT_PREVIEW_ROWS), frame);
        assert!(frame.head(0).is_empty());
    }

    #[test]
    fn test_column() {
        let frame = sales();
        let amounts = frame.column("amount").unwrap();
        assert_eq!(
            amounts,
            vec![&Value::Integer(10), &Value::Integer(20), &Value::Integer(30)]
        );
        assert!(frame.column("missing").is_none());
    }

    #[test]
    fn test_display() {
        let expected = "   id  amount\n0   1      10\n1   2      20\n2   3      30";
        assert_eq!(sales().to_string(), expected);
    }

    #[test]
    fn test_display_mixed_widths() {
        let frame = Frame::new(
            vec![
                Column::new("name", DataType::Text),
                Column::new("price", DataType::Real),
            ],
            vec![
                vec!["Laptop".into(), Value::Real(1200.0)],
                vec!["Mouse".into(), Value::Null],
            ],
        )
        .unwrap();
        let expected = "     name   price\n0  Laptop  1200.0\n1   Mouse    NULL";
        assert_eq!(frame.to_string(), expected);
    }

    #[test]
    fn test_display_empty() {
        let frame = Frame::new(
            vec![
                Column::new("a", DataType::Integer),
                Column::new("b", DataType::Text),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(frame.to_string(), "Empty table\nColumns: [a, b]\nIndex: []");
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        sales().head(2).write_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": 1, "amount": 10}, {"id": 2, "amount": 20}])
        );
    }

    #[test]
    fn test_write_json_reports_io_failure() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = sales().write_json(Closed).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_serialize_records() {
        let json = serde_json::to_value(sales().head(1)).unwrap();
        assert_eq!(json, serde_json::json!([{"id": 1, "amount": 10}]));
    }
}
