//! Full export of one database
//!
//! The data table comes from a single call; per-row metadata needs one
//! describe call per row. The metadata is joined onto the data by row id.

use crate::adapters::nucleus::DataHubApi;
use crate::domain::table::INDEX_COLUMN;
use crate::domain::{BackupError, Result, RowId, Table};

/// Data columns of `database_id` with each row's metadata joined on
///
/// A database without a tabular schema exports as [`Table::empty`].
pub async fn full_database_export(api: &dyn DataHubApi, database_id: &RowId) -> Result<Table> {
    let Some(data) = api.get_dataframe(database_id).await? else {
        return Ok(Table::empty());
    };

    let mut records = Vec::with_capacity(data.len());
    for row_id in data.index() {
        let id = RowId::new(row_id.as_str()).map_err(|e| {
            BackupError::Validation(format!("Database {database_id} has an invalid row id: {e}"))
        })?;

        let mut metadata = api.describe_row(&id).await?;
        // The row id is already the table index
        metadata.remove(INDEX_COLUMN);
        records.push((row_id.clone(), metadata));
    }

    tracing::debug!(
        database_id = %database_id,
        rows = data.len(),
        columns = data.columns().len(),
        "Joined row metadata"
    );

    Ok(data.left_join(&Table::from_records(records)))
}
