//! File download phase
//!
//! Files land in the shared files directory under their id. A file that is
//! already there is skipped before any request is made, so repeated runs
//! only fetch what is new. Downloads are written to `<id>.part` and renamed
//! into place once complete.

use crate::adapters::nucleus::DataHubApi;
use crate::core::export::manifest::{write_file_manifest, FILES_MANIFEST};
use crate::core::export::summary::{Phase, PhaseSummary};
use crate::core::pool::FetchPool;
use crate::core::progress::phase_bar;
use crate::domain::descriptors::{sort_largest_first, total_content_length};
use crate::domain::{FileDescriptor, Result};
use crate::{log_phase_complete, log_phase_start};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const PART_SUFFIX: &str = ".part";

/// Terminal state of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded { bytes: u64 },
    Skipped,
}

/// Whether the local copy at `dest` can stand in for `file`
async fn is_present(dest: &Path, file: &FileDescriptor, verify_size: bool) -> bool {
    match tokio::fs::metadata(dest).await {
        Ok(meta) if verify_size && meta.len() != file.content_length => {
            tracing::info!(
                file_id = %file.id,
                local_bytes = meta.len(),
                listed_bytes = file.content_length,
                "Local file size differs, downloading again"
            );
            false
        }
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Download one file into `dir`, unless it is already there
///
/// # Errors
///
/// URL resolution and download failures are returned as is; a partially
/// written file is removed first.
pub async fn download_file(
    api: &dyn DataHubApi,
    file: &FileDescriptor,
    dir: &Path,
    verify_size: bool,
) -> Result<DownloadStatus> {
    let dest = dir.join(file.id.as_str());
    if is_present(&dest, file, verify_size).await {
        tracing::trace!(file_id = %file.id, "Skipping existing file");
        return Ok(DownloadStatus::Skipped);
    }

    let url = api.get_download_url(&file.id).await?;

    let part = dir.join(format!("{}{}", file.id, PART_SUFFIX));
    match api.download_to(&url, &file.id, &part).await {
        Ok(bytes) => {
            tokio::fs::rename(&part, &dest).await?;
            Ok(DownloadStatus::Downloaded { bytes })
        }
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&part).await {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %part.display(),
                        error = %remove_err,
                        "Failed to remove partial download"
                    );
                }
            }
            Err(e)
        }
    }
}

/// Runs the file phase against one directory
pub struct FileExporter {
    api: Arc<dyn DataHubApi>,
    dir: PathBuf,
    workers: usize,
    verify_size: bool,
    show_progress: bool,
}

impl FileExporter {
    pub fn new(api: Arc<dyn DataHubApi>, dir: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            api,
            dir: dir.into(),
            workers,
            verify_size: false,
            show_progress: false,
        }
    }

    /// Re-download files whose local size differs from the listing
    pub fn with_size_verification(mut self, verify: bool) -> Self {
        self.verify_size = verify;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// List, record and download every file
    pub async fn run(&self) -> Result<PhaseSummary> {
        let started = Instant::now();
        std::fs::create_dir_all(&self.dir)?;

        let mut files = self.api.list_files().await?;
        write_file_manifest(&self.dir.join(FILES_MANIFEST), &files)?;

        sort_largest_first(&mut files);
        let total_mb = total_content_length(&files) / 1_000_000;
        log_phase_start!(Phase::Files, files.len());
        println!(
            "Downloading {} files to {} (total size: {} MB)",
            files.len(),
            self.dir.display(),
            total_mb
        );
        println!("(Skipping files that already exist in {})", self.dir.display());

        let mut summary = PhaseSummary::new(Phase::Files, files.len());
        let progress = phase_bar(Phase::Files.as_str(), files.len() as u64, self.show_progress);

        let api = Arc::clone(&self.api);
        let dir = self.dir.clone();
        let verify_size = self.verify_size;
        let outcome = FetchPool::new(self.workers)
            .run(
                files,
                move |file: FileDescriptor| {
                    let api = Arc::clone(&api);
                    let dir = dir.clone();
                    async move { download_file(api.as_ref(), &file, &dir, verify_size).await }
                },
                |_, status| {
                    match status {
                        DownloadStatus::Downloaded { bytes } => {
                            summary.exported += 1;
                            summary.bytes_downloaded += bytes;
                        }
                        DownloadStatus::Skipped => summary.skipped += 1,
                    }
                    Ok(())
                },
                &progress,
            )
            .await;
        progress.finish_and_clear();
        outcome?;

        let summary = summary.with_duration(started.elapsed());
        log_phase_complete!(Phase::Files, summary.exported, summary.duration);
        tracing::info!(
            downloaded = summary.exported,
            skipped = summary.skipped,
            bytes = summary.bytes_downloaded,
            "Files phase finished"
        );
        Ok(summary)
    }
}
