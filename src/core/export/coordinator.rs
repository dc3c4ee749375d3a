//! Backup coordinator - main orchestrator for the export process
//!
//! Runs the four phases strictly in sequence. Each row phase lists its
//! items, writes the manifest, then fans the per-item fetches out over a
//! [`FetchPool`]. The first failure aborts the run; later phases never
//! start.

use crate::adapters::auth::AuthProvider;
use crate::adapters::nucleus::DataHubApi;
use crate::config::ExportConfig;
use crate::core::export::database::full_database_export;
use crate::core::export::files::FileExporter;
use crate::core::export::layout::BackupLayout;
use crate::core::export::manifest::{
    write_row_manifest, write_table, DATABASES_MANIFEST, NOTEBOOKS_MANIFEST, WORKSPACES_MANIFEST,
};
use crate::core::export::summary::{BackupSummary, Phase, PhaseSummary};
use crate::core::pool::FetchPool;
use crate::core::progress::phase_bar;
use crate::domain::{BackupError, Result, RowId, RowType, Table};
use crate::{log_phase_complete, log_phase_start};
use serde_json::Value;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Tuning knobs for a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Workers for the workspace, database and notebook phases
    pub workers: usize,
    /// Workers for the file phase
    pub file_workers: usize,
    pub verify_file_size: bool,
    pub show_progress: bool,
}

impl ExportOptions {
    /// Options from configuration, capped by host parallelism
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            file_workers: config.effective_file_workers(),
            verify_file_size: config.verify_file_size,
            show_progress: config.show_progress,
        }
    }

    /// Use `workers` for every phase
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.file_workers = workers.max(1);
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Backup coordinator
pub struct BackupCoordinator {
    api: Arc<dyn DataHubApi>,
    auth: Arc<dyn AuthProvider>,
    layout: BackupLayout,
    options: ExportOptions,
}

impl BackupCoordinator {
    pub fn new(
        api: Arc<dyn DataHubApi>,
        auth: Arc<dyn AuthProvider>,
        layout: BackupLayout,
        options: ExportOptions,
    ) -> Self {
        Self {
            api,
            auth,
            layout,
            options,
        }
    }

    pub fn layout(&self) -> &BackupLayout {
        &self.layout
    }

    /// Execute the backup
    ///
    /// 1. Checks that tokens are available
    /// 2. Creates the run directories
    /// 3. Exports workspaces, databases, notebooks and files, in order
    ///
    /// # Errors
    ///
    /// Returns the first failure of any phase; artifacts written before it
    /// stay on disk.
    pub async fn execute(&self) -> Result<BackupSummary> {
        if !self.auth.tokens_exist() {
            return Err(BackupError::Authentication(
                "No auth tokens, please authenticate.".to_string(),
            ));
        }

        let started = Instant::now();
        self.layout.create_dirs()?;

        tracing::info!(
            run_dir = %self.layout.run_dir().display(),
            workers = self.options.workers,
            file_workers = self.options.file_workers,
            "Starting backup"
        );

        let mut summary = BackupSummary::new(self.layout.run_dir());
        summary.add_phase(self.export_workspaces().await?);
        summary.add_phase(self.export_databases().await?);
        summary.add_phase(self.export_notebooks().await?);
        summary.add_phase(self.export_files().await?);

        Ok(summary.with_duration(started.elapsed()))
    }

    /// Notebook document of every workspace
    pub async fn export_workspaces(&self) -> Result<PhaseSummary> {
        self.run_row_phase(
            Phase::Workspaces,
            RowType::Workspace,
            self.layout.workspaces_dir(),
            WORKSPACES_MANIFEST,
            "json",
            |api: Arc<dyn DataHubApi>, id: RowId| async move {
                api.get_row_notebook_json(&id).await
            },
            write_json,
        )
        .await
    }

    /// Full table of every database
    pub async fn export_databases(&self) -> Result<PhaseSummary> {
        self.run_row_phase(
            Phase::Databases,
            RowType::Database,
            self.layout.databases_dir(),
            DATABASES_MANIFEST,
            "csv",
            |api: Arc<dyn DataHubApi>, id: RowId| async move {
                full_database_export(api.as_ref(), &id).await
            },
            |path: &Path, table: Table| write_table(path, &table),
        )
        .await
    }

    /// Notebook document of every row
    pub async fn export_notebooks(&self) -> Result<PhaseSummary> {
        self.run_row_phase(
            Phase::Notebooks,
            RowType::Row,
            self.layout.notebooks_dir(),
            NOTEBOOKS_MANIFEST,
            "json",
            |api: Arc<dyn DataHubApi>, id: RowId| async move {
                api.get_row_notebook_json(&id).await
            },
            write_json,
        )
        .await
    }

    /// Every uploaded file, into the shared files directory
    pub async fn export_files(&self) -> Result<PhaseSummary> {
        FileExporter::new(
            Arc::clone(&self.api),
            self.layout.files_dir(),
            self.options.file_workers,
        )
        .with_size_verification(self.options.verify_file_size)
        .with_progress(self.options.show_progress)
        .run()
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_row_phase<T, F, Fut, W>(
        &self,
        phase: Phase,
        row_type: RowType,
        dir: PathBuf,
        manifest: &str,
        extension: &str,
        fetch: F,
        write: W,
    ) -> Result<PhaseSummary>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn DataHubApi>, RowId) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        W: Fn(&Path, T) -> Result<()>,
    {
        let started = Instant::now();

        let rows = self.api.list_rows(row_type).await?;
        log_phase_start!(phase, rows.len());
        write_row_manifest(&dir.join(manifest), &rows)?;

        let ids: Vec<RowId> = rows.into_iter().map(|row| row.id).collect();
        let mut summary = PhaseSummary::new(phase, ids.len());
        let progress = phase_bar(phase.as_str(), ids.len() as u64, self.options.show_progress);

        let api = Arc::clone(&self.api);
        let outcome = FetchPool::new(self.options.workers)
            .run(
                ids,
                move |id| fetch(Arc::clone(&api), id),
                |id, payload| write(&dir.join(format!("{id}.{extension}")), payload),
                &progress,
            )
            .await;
        progress.finish_and_clear();

        let report = outcome?;
        summary.exported = report.completed;

        let summary = summary.with_duration(started.elapsed());
        log_phase_complete!(phase, summary.exported, summary.duration);
        Ok(summary)
    }
}

/// Blocking write; called from the pool sink on the coordinator task.
fn write_json(path: &Path, value: Value) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &value)?;
    writer.flush()?;
    Ok(())
}
