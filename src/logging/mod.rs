//! Logging and observability
//!
//! Structured logging via `tracing`:
//! - Human-readable console output on stderr
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use eln_backup::logging::init_logging;
//! use eln_backup::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(phase = "files", "Phase started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export phase
///
/// # Example
///
/// ```no_run
/// use eln_backup::log_phase_start;
///
/// log_phase_start!("notebooks", 120);
/// ```
#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $count:expr) => {
        tracing::info!(phase = %$phase, count = $count, "Phase started");
    };
}

/// Log the completion of an export phase
///
/// # Example
///
/// ```no_run
/// use eln_backup::log_phase_complete;
/// use std::time::Duration;
///
/// log_phase_complete!("files", 42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            phase = %$phase,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Phase completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use eln_backup::log_error_with_context;
/// use eln_backup::domain::BackupError;
///
/// let error = BackupError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log pool progress after an item settles
///
/// # Example
///
/// ```no_run
/// use eln_backup::log_fetch_progress;
///
/// log_fetch_progress!("_file:abc", 10, 100);
/// ```
#[macro_export]
macro_rules! log_fetch_progress {
    ($item_id:expr, $done:expr, $total:expr) => {
        tracing::debug!(
            item_id = %$item_id,
            done = $done,
            total = $total,
            progress_pct = ($done as f64 / ($total as f64).max(1.0) * 100.0),
            "Fetch settled"
        );
    };
}
