//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for domain identifiers and values. Each newtype
//! ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Catalog-assigned numeric identifiers
// ============================================================================

/// Identifier for a registered console (assigned by the remote catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsoleId(i64);

impl ConsoleId {
    /// Create a ConsoleId from a raw catalog identifier
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier value
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl Display for ConsoleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConsoleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid ConsoleId: {e}")))
    }
}

/// Identifier for a savefile record (assigned by the remote catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Create a RecordId from a raw catalog identifier
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier value
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid RecordId: {e}")))
    }
}

// ============================================================================
// SavePath - the reconciliation join key
// ============================================================================

/// Normalized relative path of a savefile below a console's save root.
///
/// This is the join key for reconciliation: local descriptors and remote
/// records pair up when their `SavePath`s are equal. To make that comparison
/// reliable the constructor normalizes and validates:
///
/// - backslashes become forward slashes
/// - a leading `/` or `./` is stripped
/// - repeated separators collapse
/// - empty paths and `.`/`..` components are rejected
///
/// Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavePath(String);

impl SavePath {
    /// Create a SavePath, normalizing separators and validating components.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` for empty paths and for paths
    /// containing `.` or `..` components.
    pub fn new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref().replace('\\', "/");
        let trimmed = raw.trim_start_matches('/');
        let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);

        let mut components = Vec::new();
        for component in trimmed.split('/') {
            if component.is_empty() {
                // Collapse duplicate separators.
                continue;
            }
            if component == "." || component == ".." {
                return Err(DomainError::InvalidPath(format!(
                    "path '{raw}' contains a '{component}' component"
                )));
            }
            components.push(component);
        }

        if components.is_empty() {
            return Err(DomainError::InvalidPath("empty path".to_string()));
        }

        Ok(Self(components.join("/")))
    }

    /// The normalized path as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component (the savefile name)
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The directory part, or `None` for a file directly under the root
    #[must_use]
    pub fn parent_dir(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }
}

impl Display for SavePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SavePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
