//! Result type alias for eln-backup

use super::errors::BackupError;

/// Result type alias for backup operations
///
/// # Examples
///
/// ```
/// use eln_backup::domain::result::Result;
/// use eln_backup::domain::errors::BackupError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BackupError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BackupError>;
