use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::{Result, ScanError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` when it has a numeric dtype.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – a parsed file before filtering
// ---------------------------------------------------------------------------

/// Row-major table as read from disk, before missing-value and dtype filtering.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names in file order.
    pub column_names: Vec<String>,
    /// Rows; every row has `column_names.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(column_names: Vec<String>) -> Self {
        RawTable {
            column_names,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Null`.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.column_names.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the numeric view consumed by the scanners
// ---------------------------------------------------------------------------

/// One named numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl NumericColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        NumericColumn {
            name: name.into(),
            values,
        }
    }
}

/// An ordered collection of named numeric columns with aligned rows.
///
/// Every column has the same length and contains no NaN; names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<NumericColumn>,
    row_count: usize,
}

impl Dataset {
    /// Validate and build a dataset. An empty column list is allowed.
    pub fn new(columns: Vec<NumericColumn>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |c| c.values.len());

        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(ScanError::InvalidInput(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
            if col.values.len() != row_count {
                return Err(ScanError::InvalidInput(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    col.name,
                    col.values.len()
                )));
            }
            if col.values.iter().any(|v| v.is_nan()) {
                return Err(ScanError::InvalidInput(format!(
                    "column '{}' contains missing (NaN) values",
                    col.name
                )));
            }
        }

        Ok(Dataset { columns, row_count })
    }

    /// Convenience constructor from `(name, values)` pairs.
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, Vec<f64>)>,
    ) -> Result<Self> {
        Dataset::new(
            pairs
                .into_iter()
                .map(|(name, values)| NumericColumn::new(name, values))
                .collect(),
        )
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of the named column, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Gather the given rows, in the given order, into a new dataset.
    /// Indices must be in bounds.
    pub(crate) fn take_rows(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| NumericColumn {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i]).collect(),
            })
            .collect();
        Dataset {
            columns,
            row_count: indices.len(),
        }
    }
}
