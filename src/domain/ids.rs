//! Domain identifier types with validation
//!
//! Remote identifiers double as local file names (`<id>.json`, `<id>.csv`,
//! `files/<id>`), so both newtypes reject anything that could escape the
//! directory they are written into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn validate_path_safe(kind: &str, id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if id == "." || id == ".." || id.contains('/') || id.contains('\\') || id.contains('\0') {
        return Err(format!("{kind} is not usable as a file name: {id:?}"));
    }
    Ok(())
}

/// Identifier of a workspace, database or row
///
/// # Examples
///
/// ```
/// use eln_backup::domain::ids::RowId;
/// use std::str::FromStr;
///
/// let row_id = RowId::from_str("_row:W6DbkZ3jk7bwv3Hh9IJ5x").unwrap();
/// assert_eq!(row_id.as_str(), "_row:W6DbkZ3jk7bwv3Hh9IJ5x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct RowId(String);

impl RowId {
    /// Creates a new RowId, rejecting empty or path-unsafe values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_path_safe("Row ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the row ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RowId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of an uploaded file
///
/// Files are stored under the shared files directory by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct FileId(String);

impl FileId {
    /// Creates a new FileId, rejecting empty or path-unsafe values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_path_safe("File ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the file ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FileId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
