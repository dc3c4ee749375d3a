//! Export orchestration
//!
//! - [`coordinator`] - runs the four phases in order
//! - [`database`] - full database export with row metadata
//! - [`files`] - skip-if-exists file downloads
//! - [`layout`] - directory layout of a run
//! - [`manifest`] - CSV writers
//! - [`summary`] - per-phase and per-run reporting

pub mod coordinator;
pub mod database;
pub mod files;
pub mod layout;
pub mod manifest;
pub mod summary;

pub use coordinator::{BackupCoordinator, ExportOptions};
pub use files::{DownloadStatus, FileExporter};
pub use layout::BackupLayout;
pub use summary::{BackupSummary, Phase, PhaseSummary};
