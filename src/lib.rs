//! # eln-backup - ELN data hub backup
//!
//! Exports the contents of an electronic-lab-notebook data hub
//! (workspaces, databases, notebook rows and uploaded files) to local disk,
//! then mirrors the result to object storage.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Fetch pool, phase orchestration, file downloads
//! - [`adapters`] - External integrations (nucleus API, token store, sync tool)
//! - [`domain`] - Identifiers, descriptors, tables and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eln_backup::adapters::auth::{AuthProvider, TokenFileAuth};
//! use eln_backup::adapters::nucleus::NucleusClient;
//! use eln_backup::config::load_config;
//! use eln_backup::core::export::{BackupCoordinator, BackupLayout, ExportOptions};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config(None::<&str>)?;
//!     let auth = Arc::new(TokenFileAuth::from_config(&config.api)?);
//!     let client = NucleusClient::new(&config.api, auth.credentials()?)?;
//!
//!     let coordinator = BackupCoordinator::new(
//!         Arc::new(client),
//!         auth,
//!         BackupLayout::new("/backups/eln"),
//!         ExportOptions::from_config(&config.export),
//!     );
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Exported {} items", summary.total_exported());
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every phase fans out over a [`core::pool::FetchPool`] with a fixed number
//! of workers (by default `min(8, CPU count)`). Phases run one after the
//! other. The first failed fetch stops dispatch; fetches already running
//! finish, then the error is returned and later phases are skipped.
//!
//! ## Error Handling
//!
//! All library errors are [`domain::BackupError`]. Remote failures carry
//! the endpoint, the item id and the response body:
//!
//! ```rust
//! use eln_backup::domain::{BackupError, NucleusError};
//!
//! let err: BackupError = NucleusError::RequestFailed {
//!     endpoint: "CreateFileDownloadUrl".to_string(),
//!     item_id: "_file:42".to_string(),
//!     status: 403,
//!     body: "forbidden".to_string(),
//! }
//! .into();
//! assert!(err.to_string().contains("_file:42"));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
