//! On-disk layout of a backup run
//!
//! ```text
//! <outdir>/
//!   <YYYY-MM-DD_HH-MM-SS>/
//!     workspaces/   workspaces.csv, <id>.json
//!     databases/    databases.csv,  <id>.csv
//!     notebooks/    notebooks.csv,  <id>.json
//!   files/          file_metadata.csv, <id>
//! ```
//!
//! The files directory is shared by all runs so downloads can be skipped
//! when a previous run already fetched them.

use crate::domain::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Format of the per-run directory name
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Directories used by one backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupLayout {
    outdir: PathBuf,
    run_dir: PathBuf,
}

impl BackupLayout {
    /// Layout for a run starting now
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self::at(outdir, Local::now())
    }

    /// Layout for a run started at `started`
    pub fn at(outdir: impl Into<PathBuf>, started: DateTime<Local>) -> Self {
        let outdir = outdir.into();
        let run_dir = outdir.join(started.format(RUN_DIR_FORMAT).to_string());
        Self { outdir, run_dir }
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Timestamped directory of this run
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn workspaces_dir(&self) -> PathBuf {
        self.run_dir.join("workspaces")
    }

    pub fn databases_dir(&self) -> PathBuf {
        self.run_dir.join("databases")
    }

    pub fn notebooks_dir(&self) -> PathBuf {
        self.run_dir.join("notebooks")
    }

    /// Shared download directory, outside the run directory
    pub fn files_dir(&self) -> PathBuf {
        self.outdir.join("files")
    }

    /// Create every directory of the layout
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [
            self.workspaces_dir(),
            self.databases_dir(),
            self.notebooks_dir(),
            self.files_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        tracing::debug!(run_dir = %self.run_dir.display(), "Created backup directories");
        Ok(())
    }
}
