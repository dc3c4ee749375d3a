//! In-memory tabular export of one database
//!
//! A [`Table`] keeps ordered column names, a row index (the remote row ids)
//! and one cell vector per row. It supports the single relational operation
//! the export needs: a left join of a metadata table onto the data table,
//! keyed by row id.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Column name of the row index in CSV output
pub const INDEX_COLUMN: &str = "id";

/// Suffix appended to metadata columns whose name clashes with a data column
pub const METADATA_SUFFIX: &str = "_metadata";

/// Suffix appended to a data column whose name clashes with [`INDEX_COLUMN`]
pub const DATA_SUFFIX: &str = "_data";

/// Ordered, row-indexed table of JSON cell values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the given columns and no rows
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a table from keyed records
    ///
    /// Columns are the union of all record keys, in first-seen order.
    /// Missing cells are `null`.
    pub fn from_records(records: Vec<(String, Map<String, Value>)>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for (_, record) in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Self::with_columns(columns);
        for (row_id, mut record) in records {
            let cells = table
                .columns
                .iter()
                .map(|c| record.remove(c).unwrap_or(Value::Null))
                .collect();
            table.index.push(row_id);
            table.rows.push(cells);
        }
        table
    }

    /// Append a row; the cell count must match the column count
    pub fn push_row(&mut self, row_id: impl Into<String>, cells: Vec<Value>) -> Result<(), String> {
        if cells.len() != self.columns.len() {
            return Err(format!(
                "Row has {} cells but table has {} columns",
                cells.len(),
                self.columns.len()
            ));
        }
        self.index.push(row_id.into());
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row ids, in row order
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the table has neither columns nor rows
    pub fn is_blank(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Cell at (row id, column), if both exist
    pub fn get(&self, row_id: &str, column: &str) -> Option<&Value> {
        let row = self.index.iter().position(|r| r == row_id)?;
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Iterate rows as (row id, cells)
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.index
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Left join `other` onto `self` by row id
    ///
    /// Every row of `self` is kept in order; rows of `other` without a
    /// matching id are dropped; unmatched rows get `null` for the joined
    /// columns. Joined columns whose name is already taken get
    /// [`METADATA_SUFFIX`] appended.
    pub fn left_join(&self, other: &Table) -> Table {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if self.columns.contains(column) {
                columns.push(format!("{column}{METADATA_SUFFIX}"));
            } else {
                columns.push(column.clone());
            }
        }

        let mut lookup: HashMap<&str, &Vec<Value>> = HashMap::with_capacity(other.len());
        for (row_id, cells) in other.index.iter().zip(&other.rows) {
            lookup.entry(row_id.as_str()).or_insert(cells);
        }

        let rows = self
            .index
            .iter()
            .zip(&self.rows)
            .map(|(row_id, cells)| {
                let mut joined = cells.clone();
                match lookup.get(row_id.as_str()) {
                    Some(extra) => joined.extend(extra.iter().cloned()),
                    None => joined.extend(std::iter::repeat(Value::Null).take(other.columns.len())),
                }
                joined
            })
            .collect();

        Table {
            columns,
            index: self.index.clone(),
            rows,
        }
    }
}

/// Render a JSON cell as CSV text
///
/// Strings are written raw, `null` as an empty field, everything else as
/// compact JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
