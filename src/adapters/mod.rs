//! External system integrations for eln-backup.
//!
//! - [`auth`] - token store and credentials
//! - [`nucleus`] - ELN data hub API client
//! - [`sync`] - mirroring the backup directory to object storage
//!
//! Adapters isolate third-party protocols behind traits so the export
//! pipeline can be tested with in-memory implementations.

pub mod auth;
pub mod nucleus;
pub mod sync;
