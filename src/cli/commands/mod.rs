//! CLI command implementations

pub mod backup;

use crate::domain::BackupError;

/// Backup and mirror completed
pub const EXIT_SUCCESS: i32 = 0;
/// The sync tool is not installed; local artifacts are complete
pub const EXIT_SYNC_TOOL_MISSING: i32 = 1;
/// Invalid configuration
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Missing or unusable credentials
pub const EXIT_AUTH_ERROR: i32 = 3;
/// Export failed
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error that ended the run
pub fn exit_code_for(error: &BackupError) -> i32 {
    match error {
        BackupError::Configuration(_) => EXIT_CONFIG_ERROR,
        BackupError::Authentication(_) => EXIT_AUTH_ERROR,
        _ => EXIT_FATAL,
    }
}
