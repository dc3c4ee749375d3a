//! Configuration management for eln-backup.
//!
//! # Overview
//!
//! Configuration is optional. Without a file every setting takes its
//! default; with one (`--config`), it supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ELN_BACKUP_<SECTION>_<KEY>` environment overrides
//! - Validation of every section
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://os.deeporigin.io"
//! timeout_seconds = 60
//! organization_id = "${ELN_ORG_ID}"
//!
//! [export]
//! max_workers = 8
//! file_workers = 8
//! verify_file_size = false
//!
//! [sync]
//! tool = "s5cmd"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/eln-backup"
//! local_rotation = "daily"
//! ```
//!
//! ```rust,no_run
//! use eln_backup::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Some("eln-backup.toml"))?;
//! println!("API: {}", config.api.base_url);
//! println!("File workers: {}", config.export.effective_file_workers());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApiConfig, ApplicationConfig, BackupConfig, ExportConfig, LoggingConfig, SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
