//! Mirror the local backup to object storage
//!
//! The mirror step shells out to an external sync tool (`s5cmd` by
//! default) once all phases have finished. Only the exit status of the tool
//! is observed; it is logged, not acted upon.

use crate::config::SyncConfig;
use crate::domain::{BackupError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What the mirror step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The tool ran; `success` reflects its exit status
    Completed { success: bool },
    /// The tool is not installed
    ToolMissing,
    /// No destination was given, nothing to mirror to
    NoDestination,
}

impl MirrorOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            MirrorOutcome::ToolMissing => 1,
            MirrorOutcome::Completed { .. } | MirrorOutcome::NoDestination => 0,
        }
    }
}

/// Runs `<tool> sync <outdir> <destination>`
#[derive(Debug, Clone)]
pub struct S3Mirror {
    tool: String,
}

impl S3Mirror {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.tool.clone())
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Resolve the tool on `PATH`
    pub fn locate(&self) -> Option<PathBuf> {
        self.locate_in(std::env::var_os("PATH"))
    }

    /// Resolve the tool against an explicit search path
    ///
    /// A tool name containing a path separator is checked as-is.
    pub fn locate_in(&self, search_path: Option<OsString>) -> Option<PathBuf> {
        let tool = Path::new(&self.tool);
        if tool.components().count() > 1 {
            return is_executable(tool).then(|| tool.to_path_buf());
        }

        let search_path = search_path?;
        std::env::split_paths(&search_path)
            .map(|dir| dir.join(&self.tool))
            .find(|candidate| is_executable(candidate))
    }

    /// Mirror `outdir` to `destination`
    ///
    /// The tool is looked up first, so a missing tool is reported even
    /// when there is no destination.
    ///
    /// # Errors
    ///
    /// Fails only when the located tool cannot be started.
    pub async fn mirror(&self, outdir: &Path, destination: Option<&str>) -> Result<MirrorOutcome> {
        let Some(program) = self.locate() else {
            tracing::warn!(tool = %self.tool, "Sync tool not found on PATH");
            return Ok(MirrorOutcome::ToolMissing);
        };

        let Some(destination) = destination else {
            tracing::info!("No S3 destination given, skipping mirror");
            return Ok(MirrorOutcome::NoDestination);
        };

        self.run(&program, outdir, destination).await
    }

    async fn run(&self, program: &Path, outdir: &Path, destination: &str) -> Result<MirrorOutcome> {
        tracing::info!(
            tool = %program.display(),
            source = %outdir.display(),
            destination,
            "Mirroring backup"
        );

        let status = tokio::process::Command::new(program)
            .arg("sync")
            .arg(outdir)
            .arg(destination)
            .status()
            .await
            .map_err(|e| BackupError::Sync(format!("Failed to run {}: {}", self.tool, e)))?;

        if status.success() {
            tracing::info!("Mirror completed");
        } else {
            tracing::warn!(status = %status, "Mirror finished with a non-zero exit status");
        }

        Ok(MirrorOutcome::Completed {
            success: status.success(),
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
