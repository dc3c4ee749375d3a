//! End-to-end tests of a backup run against an in-memory data hub

mod common;

use common::{file, line_count, row, FakeAuth, FakeDataHub};
use eln_backup::core::export::{BackupCoordinator, BackupLayout, ExportOptions, Phase};
use eln_backup::domain::{BackupError, RowType, Table};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn options() -> ExportOptions {
    ExportOptions {
        workers: 3,
        file_workers: 2,
        verify_file_size: false,
        show_progress: false,
    }
}

fn sample_hub() -> FakeDataHub {
    let mut data = Table::with_columns(vec!["owner".to_string()]);
    data.push_row("_row:r1", vec![json!("x")]).unwrap();
    data.push_row("_row:r2", vec![json!("y")]).unwrap();

    FakeDataHub::new()
        .with_rows(
            RowType::Workspace,
            vec![row("_row:ws1", RowType::Workspace), row("_row:ws2", RowType::Workspace)],
        )
        .with_rows(
            RowType::Database,
            vec![
                row("_row:db1", RowType::Database).with_parent_id("_row:ws1"),
                row("_row:db2", RowType::Database).with_parent_id("_row:ws2"),
            ],
        )
        .with_rows(
            RowType::Row,
            vec![
                row("_row:r1", RowType::Row).with_parent_id("_row:db1"),
                row("_row:r2", RowType::Row).with_parent_id("_row:db1"),
                row("_row:r3", RowType::Row).with_parent_id("_row:ws2"),
            ],
        )
        .with_table("_row:db1", data)
        .with_metadata("_row:r1", json!({"id": "_row:r1", "hid": "r-1", "name": "first"}))
        .with_metadata("_row:r2", json!({"id": "_row:r2", "hid": "r-2", "name": "second"}))
        .with_files(vec![file("_file:a", 4), file("_file:b", 9)])
}

fn coordinator(api: Arc<FakeDataHub>, outdir: &std::path::Path) -> BackupCoordinator {
    BackupCoordinator::new(
        api,
        Arc::new(FakeAuth::with_tokens()),
        BackupLayout::new(outdir),
        options(),
    )
}

#[tokio::test]
async fn test_full_backup_writes_every_artifact() {
    let outdir = TempDir::new().unwrap();
    let api = Arc::new(sample_hub());
    let coordinator = coordinator(api.clone(), outdir.path());

    let summary = coordinator.execute().await.unwrap();
    let layout = coordinator.layout();

    // Manifests hold a header plus one line per listed item
    assert_eq!(line_count(&layout.workspaces_dir().join("workspaces.csv")), 3);
    assert_eq!(line_count(&layout.databases_dir().join("databases.csv")), 3);
    assert_eq!(line_count(&layout.notebooks_dir().join("notebooks.csv")), 4);
    assert_eq!(line_count(&layout.files_dir().join("file_metadata.csv")), 3);

    for id in ["_row:ws1", "_row:ws2"] {
        assert!(layout.workspaces_dir().join(format!("{id}.json")).is_file());
    }
    for id in ["_row:db1", "_row:db2"] {
        assert!(layout.databases_dir().join(format!("{id}.csv")).is_file());
    }
    for id in ["_row:r1", "_row:r2", "_row:r3"] {
        let path = layout.notebooks_dir().join(format!("{id}.json"));
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(doc["id"], id);
    }
    assert_eq!(std::fs::metadata(layout.files_dir().join("_file:b")).unwrap().len(), 9);

    assert_eq!(summary.phases.len(), 4);
    assert_eq!(summary.phase(Phase::Notebooks).map(|p| p.exported), Some(3));
    assert_eq!(summary.phase(Phase::Files).map(|p| p.bytes_downloaded), Some(13));
}

#[tokio::test]
async fn test_database_export_joins_row_metadata() {
    let outdir = TempDir::new().unwrap();
    let coordinator = coordinator(Arc::new(sample_hub()), outdir.path());

    coordinator.execute().await.unwrap();

    let csv = std::fs::read_to_string(coordinator.layout().databases_dir().join("_row:db1.csv"))
        .unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines, vec!["id,owner,hid,name", "_row:r1,x,r-1,first", "_row:r2,y,r-2,second"]);
}

#[tokio::test]
async fn test_database_without_schema_exports_empty_file() {
    let outdir = TempDir::new().unwrap();
    let coordinator = coordinator(Arc::new(sample_hub()), outdir.path());

    coordinator.execute().await.unwrap();

    let path = coordinator.layout().databases_dir().join("_row:db2.csv");
    assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
}

#[tokio::test]
async fn test_failure_aborts_later_phases() {
    let outdir = TempDir::new().unwrap();
    let api = Arc::new(sample_hub().failing_on("_row:r2"));
    let coordinator = coordinator(api.clone(), outdir.path());

    let err = coordinator.execute().await.unwrap_err();
    assert!(err.to_string().contains("_row:r2"), "{err}");

    let layout = coordinator.layout();
    // Earlier phases stay on disk
    assert!(layout.workspaces_dir().join("_row:ws1.json").is_file());
    // The file phase never started
    assert!(api.calls_to("ListFiles").is_empty());
    assert!(!layout.files_dir().join("file_metadata.csv").exists());
}

#[tokio::test]
async fn test_missing_tokens_is_authentication_error() {
    let outdir = TempDir::new().unwrap();
    let api = Arc::new(sample_hub());
    let coordinator = BackupCoordinator::new(
        api.clone(),
        Arc::new(FakeAuth::without_tokens()),
        BackupLayout::new(outdir.path()),
        options(),
    );

    let err = coordinator.execute().await.unwrap_err();

    assert!(matches!(err, BackupError::Authentication(_)));
    assert!(api.calls.lock().unwrap().is_empty());
    assert!(!coordinator.layout().run_dir().exists());
}

#[tokio::test]
async fn test_empty_account_writes_header_only_manifests() {
    let outdir = TempDir::new().unwrap();
    let coordinator = coordinator(Arc::new(FakeDataHub::new()), outdir.path());

    let summary = coordinator.execute().await.unwrap();

    assert_eq!(summary.total_exported(), 0);
    let manifest = coordinator.layout().workspaces_dir().join("workspaces.csv");
    assert_eq!(line_count(&manifest), 1);
}

#[tokio::test]
async fn test_row_fetches_respect_worker_limit() {
    let outdir = TempDir::new().unwrap();
    let rows = (0..12)
        .map(|i| row(&format!("_row:n{i}"), RowType::Row))
        .collect();
    let api = Arc::new(
        FakeDataHub::new()
            .with_rows(RowType::Row, rows)
            .with_delay(std::time::Duration::from_millis(5)),
    );

    coordinator(api.clone(), outdir.path()).execute().await.unwrap();

    assert!(api.peak_in_flight() <= options().workers);
    assert_eq!(api.calls_to("Notebook").len(), 12);
}
