//! Domain models and types for eln-backup.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RowId`], [`FileId`])
//! - **Listing descriptors** ([`RowDescriptor`], [`FileDescriptor`])
//! - **Tabular database exports** ([`Table`])
//! - **Error types** ([`BackupError`], [`NucleusError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are also used as local file names, so they are validated on
//! construction and on deserialization:
//!
//! ```rust
//! use eln_backup::domain::{FileId, RowId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let row_id = RowId::new("_row:abc")?;
//! let file_id = FileId::new("_file:def")?;
//!
//! assert!(FileId::new("../escape").is_err());
//! # Ok(())
//! # }
//! ```

pub mod descriptors;
pub mod errors;
pub mod ids;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use descriptors::{FileDescriptor, RowDescriptor, RowType};
pub use errors::{BackupError, NucleusError};
pub use ids::{FileId, RowId};
pub use result::Result;
pub use table::Table;
