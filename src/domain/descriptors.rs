//! Descriptors returned by the remote listing calls
//!
//! The ELN API returns loosely shaped JSON records. Downstream code (manifest
//! writing, join keys, size ordering) depends on a handful of fields, so the
//! listing results are decoded into explicit structs here. Field names follow
//! the manifest column names; the API's camelCase spellings are accepted as
//! aliases.

use super::ids::{FileId, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of row the listing call should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    /// Top-level workspace
    Workspace,
    /// Database (tabular collection of rows)
    Database,
    /// Single row; carries notebook content
    Row,
}

impl RowType {
    /// Wire name of the row type
    pub fn as_str(&self) -> &'static str {
        match self {
            RowType::Workspace => "workspace",
            RowType::Database => "database",
            RowType::Row => "row",
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing entry for a workspace, database or row
///
/// One manifest line is written per descriptor, in listing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDescriptor {
    /// Remote identifier
    pub id: RowId,

    /// Human-readable id (e.g. `ws-1`, `db-12-3`)
    #[serde(default)]
    pub hid: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Row kind
    #[serde(alias = "type", alias = "rowType")]
    pub row_type: RowType,

    /// Enclosing workspace or database
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,

    #[serde(default, alias = "dateCreated")]
    pub date_created: Option<String>,

    #[serde(default, alias = "dateUpdated")]
    pub date_updated: Option<String>,
}

impl RowDescriptor {
    /// Manifest column names, in serialization order
    pub const MANIFEST_HEADERS: [&'static str; 7] = [
        "id",
        "hid",
        "name",
        "row_type",
        "parent_id",
        "date_created",
        "date_updated",
    ];

    /// Create a descriptor with only the mandatory fields set
    pub fn new(id: RowId, row_type: RowType) -> Self {
        Self {
            id,
            hid: None,
            name: None,
            row_type,
            parent_id: None,
            date_created: None,
            date_updated: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the enclosing row
    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Metadata for one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Remote identifier, also the local file name
    pub id: FileId,

    #[serde(default)]
    pub name: Option<String>,

    /// Size in bytes as reported by the platform
    #[serde(default, alias = "contentLength")]
    pub content_length: u64,

    #[serde(default, alias = "contentType")]
    pub content_type: Option<String>,

    /// Upload status (`ready`, `archived`, ...)
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default, alias = "dateCreated")]
    pub date_created: Option<String>,
}

impl FileDescriptor {
    /// Manifest column names, in serialization order
    pub const MANIFEST_HEADERS: [&'static str; 7] = [
        "id",
        "name",
        "content_length",
        "content_type",
        "status",
        "uri",
        "date_created",
    ];

    /// Create a descriptor with id and size only
    pub fn new(id: FileId, content_length: u64) -> Self {
        Self {
            id,
            name: None,
            content_length,
            content_type: None,
            status: None,
            uri: None,
            date_created: None,
        }
    }

    /// Set the original file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Sorts files so the largest are dispatched first
///
/// The sort is stable: files of equal size keep their listing order.
pub fn sort_largest_first(files: &mut [FileDescriptor]) {
    files.sort_by(|a, b| b.content_length.cmp(&a.content_length));
}

/// Sum of the reported sizes, in bytes
pub fn total_content_length(files: &[FileDescriptor]) -> u64 {
    files.iter().map(|f| f.content_length).sum()
}
