//! Columnar in-memory table for catalog rows
//!
//! Every stage takes a `&KoiTable` and returns a fresh table, so a caller
//! holding the input never observes a mutation.

use crate::error::{ExoplanetError, Result};
use serde::{Deserialize, Serialize};

/// Values of one column; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(values) => values[row].map_or(true, f64::is_nan),
            ColumnData::Text(values) => values[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&r| values[r]).collect())
            }
            ColumnData::Text(values) => {
                ColumnData::Text(rows.iter().map(|&r| values[r].clone()).collect())
            }
        }
    }
}

/// Named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }
}

/// Ordered collection of equal-length columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KoiTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl KoiTable {
    /// Create new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting ragged or duplicate columns
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = KoiTable::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// True when every name is present
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_column(name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|idx| &self.columns[idx])
    }

    /// Numeric values of a column, `None` if absent or textual
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Numeric(values)) => Some(values),
            _ => None,
        }
    }

    /// Text values of a column, `None` if absent or numeric
    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name).map(|c| &c.data) {
            Some(ColumnData::Text(values)) => Some(values),
            _ => None,
        }
    }

    /// Names of all numeric columns, in table order
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Append a column, or replace an existing one with the same name
    pub fn set_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.n_rows = column.data.len();
        } else if column.data.len() != self.n_rows {
            return Err(ExoplanetError::ShapeError {
                expected: format!("{} rows in column '{}'", self.n_rows, column.name),
                actual: format!("{} rows", column.data.len()),
            });
        }

        match self.position(&column.name) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Append or replace a numeric column
    pub fn set_numeric(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.set_column(Column::numeric(name, values))
    }

    /// Copy of the table without the named columns; unknown names are ignored
    pub fn without_columns(&self, names: &[&str]) -> KoiTable {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        let n_rows = if columns.is_empty() { 0 } else { self.n_rows };
        KoiTable { columns, n_rows }
    }

    /// Copy of the table keeping rows where `keep` is true
    pub fn filter_rows(&self, keep: &[bool]) -> Result<KoiTable> {
        if keep.len() != self.n_rows {
            return Err(ExoplanetError::ShapeError {
                expected: format!("row mask of length {}", self.n_rows),
                actual: format!("length {}", keep.len()),
            });
        }
        let rows: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(idx, &k)| if k { Some(idx) } else { None })
            .collect();
        self.take_rows(&rows)
    }

    /// Copy of the table with rows gathered by index (repeats allowed)
    pub fn take_rows(&self, rows: &[usize]) -> Result<KoiTable> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows) {
            return Err(ExoplanetError::ShapeError {
                expected: format!("row index < {}", self.n_rows),
                actual: bad.to_string(),
            });
        }
        Ok(KoiTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.select(rows),
                })
                .collect(),
            n_rows: rows.len(),
        })
    }

    /// True if any cell of the row is missing
    pub fn row_has_missing(&self, row: usize) -> bool {
        self.columns.iter().any(|c| c.data.is_missing(row))
    }

    fn push_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(ExoplanetError::Validation(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        self.set_column(column)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
