//! Data hub API trait
//!
//! The export pipeline only talks to the platform through [`DataHubApi`],
//! so tests can drive every phase with an in-memory implementation.

use crate::domain::{FileDescriptor, FileId, Result, RowDescriptor, RowId, RowType, Table};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

/// Remote listing, describe and download operations
///
/// Implementations must be shareable across pool workers.
#[async_trait]
pub trait DataHubApi: Send + Sync {
    /// List every row of the given kind
    async fn list_rows(&self, row_type: RowType) -> Result<Vec<RowDescriptor>>;

    /// List metadata for every uploaded file
    async fn list_files(&self) -> Result<Vec<FileDescriptor>>;

    /// Tabular contents of a database, indexed by row id
    ///
    /// `Ok(None)` means the database could not be represented as a table.
    async fn get_dataframe(&self, database_id: &RowId) -> Result<Option<Table>>;

    /// Descriptor of a single row, without field values
    async fn describe_row(&self, row_id: &RowId) -> Result<Map<String, Value>>;

    /// Full JSON document of a row, including notebook content
    async fn get_row_notebook_json(&self, row_id: &RowId) -> Result<Value>;

    /// Short-lived presigned URL for a file
    async fn get_download_url(&self, file_id: &FileId) -> Result<String>;

    /// Stream `url` into `dest`, returning the number of bytes written
    ///
    /// Nothing is written when the server answers with a non-success status.
    async fn download_to(&self, url: &str, file_id: &FileId, dest: &Path) -> Result<u64>;
}
