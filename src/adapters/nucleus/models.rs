//! Wire models for the nucleus API
//!
//! Every endpoint wraps its payload in a `{"data": ...}` envelope. Only the
//! fields the backup reads are modelled; everything else is ignored.

use crate::domain::{FileDescriptor, RowDescriptor};
use serde::Deserialize;
use serde_json::Value;

/// Standard response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `ListRows` item
pub type RowListing = Vec<RowDescriptor>;

/// `ListFiles` item: the descriptor is nested under `file`
#[derive(Debug, Deserialize)]
pub struct FileListingEntry {
    pub file: FileDescriptor,
}

/// `CreateFileDownloadUrl` payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrl {
    pub download_url: String,
}

/// Column of a database, as returned by `DescribeRow` on the database row
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseColumn {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl DatabaseColumn {
    /// Header used in the exported table
    pub fn label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(self.id.as_str())
    }
}

/// One cell of a database row
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub column_id: String,
    #[serde(default)]
    pub value: Value,
}

/// `ListDatabaseRows` item
#[derive(Debug, Deserialize)]
pub struct DatabaseRow {
    pub id: String,
    #[serde(default)]
    pub fields: Option<Vec<FieldValue>>,
}

impl DatabaseRow {
    /// Cell for `column_id`, `null` when absent
    pub fn value_of(&self, column_id: &str) -> Value {
        self.fields
            .as_ref()
            .and_then(|fields| fields.iter().find(|f| f.column_id == column_id))
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }
}

/// Extract the column schema from a database description
///
/// Returns `None` when the description has no usable `cols` array, which
/// is how a row that is not a tabular database shows up.
pub fn database_columns(description: &Value) -> Option<Vec<DatabaseColumn>> {
    let cols = description.get("cols")?.as_array()?;
    cols.iter()
        .map(|c| serde_json::from_value::<DatabaseColumn>(c.clone()).ok())
        .collect()
}
