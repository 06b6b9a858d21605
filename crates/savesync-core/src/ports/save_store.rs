//! Local save store port (driven/secondary port)
//!
//! Interface for the local filesystem side of a reconciliation pass:
//! scanning a console's save root into descriptors, reading savefiles for
//! upload, and writing downloaded content atomically.
//!
//! ## Design Notes
//!
//! - Writes go through a temp-file-then-rename sequence so a crash
//!   mid-write never leaves a half-written savefile in place of a good one.
//! - `scan` never returns two descriptors with the same relative path; the
//!   matcher still treats a duplicate as fatal if an implementation slips.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::actions::FailureReason;
use crate::domain::newtypes::SavePath;
use crate::domain::savefile::LocalFileDescriptor;

/// Errors raised by local save store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The save root itself is missing or unreadable
    #[error("save root '{root}' is not accessible: {source}")]
    Root {
        /// The configured root directory
        root: String,
        /// The underlying io error
        #[source]
        source: io::Error,
    },

    /// A savefile could not be read
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path relative to the save root
        path: String,
        /// The underlying io error
        #[source]
        source: io::Error,
    },

    /// A savefile could not be written
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Path relative to the save root
        path: String,
        /// The underlying io error
        #[source]
        source: io::Error,
    },
}

impl From<StoreError> for FailureReason {
    fn from(err: StoreError) -> Self {
        FailureReason::Io(err.to_string())
    }
}

/// Port trait for local savefile storage
#[async_trait::async_trait]
pub trait SaveStore: Send + Sync {
    /// Walks `root` recursively and produces one descriptor per file
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Root`] if the root is missing or unreadable.
    async fn scan(&self, root: &Path) -> Result<Vec<LocalFileDescriptor>, StoreError>;

    /// Reads the content of a savefile below `root`
    async fn read(&self, root: &Path, path: &SavePath) -> Result<Vec<u8>, StoreError>;

    /// Writes savefile content below `root` atomically and stamps its
    /// modification time with `mtime`
    ///
    /// Parent directories are created as needed. The data lands in a
    /// temporary file first and is renamed over the target, so concurrent
    /// readers and crashes never observe partial content.
    async fn write_atomic(
        &self,
        root: &Path,
        path: &SavePath,
        bytes: &[u8],
        mtime: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Creates the save root directory if it does not exist yet
    async fn ensure_root(&self, root: &Path) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Read {
            path: "slot1.bin".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("slot1.bin"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_failure_reason_mapping() {
        let err = StoreError::Write {
            path: "slot1.bin".to_string(),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(matches!(FailureReason::from(err), FailureReason::Io(_)));
    }
}
