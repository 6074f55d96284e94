use log::debug;

use super::model::{CellValue, Dataset, NumericColumn, RawTable};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Remove every row that has a missing value in any column.
///
/// Non-numeric columns count too, so a row with an empty label cell is
/// dropped even though the label column is discarded later.
pub fn drop_missing_rows(table: &mut RawTable) -> usize {
    let before = table.rows.len();
    table
        .rows
        .retain(|row| !row.iter().any(CellValue::is_null));
    let dropped = before - table.rows.len();
    if dropped > 0 {
        debug!("dropped {dropped} of {before} rows with missing values");
    }
    dropped
}

// ---------------------------------------------------------------------------
// Numeric column selection
// ---------------------------------------------------------------------------

/// First cell of column `idx` that is not an Integer/Float, if any.
fn first_non_numeric(table: &RawTable, idx: usize) -> Option<&CellValue> {
    table
        .rows
        .iter()
        .map(|row| &row[idx])
        .find(|cell| cell.as_f64().is_none())
}

/// Build a [`Dataset`] from the numeric columns of `table`.
///
/// Expects missing values to be dropped already (see [`drop_missing_rows`]).
/// With no rows left every column is kept (empty), so the scanners report
/// the missing rows rather than missing columns.
pub fn numeric_columns(table: &RawTable) -> Result<Dataset> {
    let mut columns = Vec::new();
    for (idx, name) in table.column_names.iter().enumerate() {
        if let Some(cell) = first_non_numeric(table, idx) {
            debug!("skipping non-numeric column '{name}' (found {cell})");
            continue;
        }
        let values = table
            .rows
            .iter()
            .filter_map(|row| row[idx].as_f64())
            .collect();
        columns.push(NumericColumn::new(name.clone(), values));
    }
    Dataset::new(columns)
}

/// Drop missing rows, then keep numeric columns.
pub fn to_numeric_dataset(mut table: RawTable) -> Result<Dataset> {
    drop_missing_rows(&mut table);
    numeric_columns(&table)
}
