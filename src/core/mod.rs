//! Core backup logic.
//!
//! # Modules
//!
//! - [`pool`] - bounded-concurrency fetch pool
//! - [`export`] - phase orchestration, file downloads, manifests
//! - [`progress`] - terminal progress bars
//!
//! # Backup Workflow
//!
//! 1. **Workspaces**: list, write `workspaces.csv`, fetch each notebook JSON
//! 2. **Databases**: list, write `databases.csv`, export each table with row metadata
//! 3. **Notebooks**: list rows, write `notebooks.csv`, fetch each notebook JSON
//! 4. **Files**: list, write `file_metadata.csv`, download missing files largest first
//!
//! # Example
//!
//! ```rust,no_run
//! use eln_backup::adapters::auth::{AuthProvider, TokenFileAuth};
//! use eln_backup::adapters::nucleus::NucleusClient;
//! use eln_backup::config::load_config;
//! use eln_backup::core::export::{BackupCoordinator, BackupLayout, ExportOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None::<&str>)?;
//! let auth = Arc::new(TokenFileAuth::from_config(&config.api)?);
//! let client = NucleusClient::new(&config.api, auth.credentials()?)?;
//!
//! let coordinator = BackupCoordinator::new(
//!     Arc::new(client),
//!     auth,
//!     BackupLayout::new("/backups/eln"),
//!     ExportOptions::from_config(&config.export),
//! );
//!
//! let summary = coordinator.execute().await?;
//! println!("Exported: {}", summary.total_exported());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod pool;
pub mod progress;
