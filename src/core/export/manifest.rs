//! Manifest and table CSV writers

use crate::domain::table::{render_cell, DATA_SUFFIX, INDEX_COLUMN};
use crate::domain::{FileDescriptor, Result, RowDescriptor, Table};
use serde::Serialize;
use std::path::Path;

/// Manifest name of the workspaces phase
pub const WORKSPACES_MANIFEST: &str = "workspaces.csv";
/// Manifest name of the databases phase
pub const DATABASES_MANIFEST: &str = "databases.csv";
/// Manifest name of the notebooks phase
pub const NOTEBOOKS_MANIFEST: &str = "notebooks.csv";
/// Manifest name of the files phase
pub const FILES_MANIFEST: &str = "file_metadata.csv";

fn write_records<T: Serialize>(path: &Path, headers: &[&str], records: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    // Written by hand so an empty listing still yields a header line
    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::debug!(path = %path.display(), rows = records.len(), "Wrote manifest");
    Ok(())
}

/// Write one line per row descriptor, in listing order
pub fn write_row_manifest(path: &Path, rows: &[RowDescriptor]) -> Result<()> {
    write_records(path, &RowDescriptor::MANIFEST_HEADERS, rows)
}

/// Write one line per file, indexed by file id
pub fn write_file_manifest(path: &Path, files: &[FileDescriptor]) -> Result<()> {
    write_records(path, &FileDescriptor::MANIFEST_HEADERS, files)
}

/// Header line of a table: the index column, then the data columns
///
/// A data column named like an earlier header gets [`DATA_SUFFIX`] until
/// it is unique.
fn table_header(table: &Table) -> Vec<String> {
    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(INDEX_COLUMN.to_string());
    for column in table.columns() {
        let mut name = column.clone();
        while header.contains(&name) {
            name.push_str(DATA_SUFFIX);
        }
        header.push(name);
    }
    header
}

/// Write a database table with its row index as the first column
///
/// A table with neither columns nor rows yields an empty file. The write
/// is blocking and runs on whichever task calls it.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if table.is_blank() {
        std::fs::write(path, b"")?;
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(table_header(table))?;

    for (row_id, cells) in table.rows() {
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(row_id.to_string());
        record.extend(cells.iter().map(render_cell));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileId, RowId, RowType};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_row_manifest_lines_match_listing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(WORKSPACES_MANIFEST);
        let rows = vec![
            RowDescriptor::new(RowId::new("_row:b").unwrap(), RowType::Workspace).with_name("B"),
            RowDescriptor::new(RowId::new("_row:a").unwrap(), RowType::Workspace)
                .with_name("A, with comma"),
        ];

        write_row_manifest(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("id"));
        assert_eq!(headers.len(), RowDescriptor::MANIFEST_HEADERS.len());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(0), Some("_row:b"));
        assert_eq!(records[1].get(2), Some("A, with comma"));
        assert_eq!(records[1].get(3), Some("workspace"));
    }

    #[test]
    fn test_empty_manifest_has_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(NOTEBOOKS_MANIFEST);
        write_row_manifest(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.starts_with("id,hid,name"));
    }

    #[test]
    fn test_file_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(FILES_MANIFEST);
        let files = vec![FileDescriptor::new(FileId::new("_file:1").unwrap(), 42).with_name("x.png")];

        write_file_manifest(&path, &files).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("id,name,content_length,content_type,status,uri,date_created"));
        assert_eq!(lines.next(), Some("_file:1,x.png,42,,,,"));
    }

    #[test]
    fn test_write_table_with_index() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.csv");
        let mut table = Table::with_columns(vec!["Concentration".to_string(), "owner".to_string()]);
        table.push_row("r1", vec![json!(1.5), json!("x")]).unwrap();
        table.push_row("r2", vec![json!(null), json!("y")]).unwrap();

        write_table(&path, &table).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "id,Concentration,owner\nr1,1.5,x\nr2,,y\n");
    }

    #[test]
    fn test_data_column_named_like_index_is_renamed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.csv");
        let mut table = Table::with_columns(vec![
            "id".to_string(),
            "owner".to_string(),
            "id_data".to_string(),
        ]);
        table
            .push_row("_row:r1", vec![json!("SAMPLE-1"), json!("x"), json!(7)])
            .unwrap();

        write_table(&path, &table).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "id,id_data,owner,id_data_data\n_row:r1,SAMPLE-1,x,7\n"
        );
    }

    #[test]
    fn test_blank_table_is_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.csv");
        write_table(&path, &Table::empty()).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }
}
