//! Domain error types
//!
//! Errors raised by domain-level validation: invalid paths, ambiguous join
//! keys, unknown mode codes. All of these indicate a data-integrity or
//! configuration problem and abort a reconciliation pass before any I/O,
//! as opposed to per-path transfer failures which are recorded in the
//! per-file result list.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid relative path format or content
    #[error("Invalid save path: {0}")]
    InvalidPath(String),

    /// Two local descriptors or two remote records share a relative path
    /// after normalization. The join key is ambiguous; the pass aborts.
    #[error("Duplicate save path in reconciliation input: {0}")]
    DuplicatePath(String),

    /// Unrecognized crawl/action mode code (valid: u, f, n, a, l)
    #[error("Unknown mode code '{0}' (expected one of: u, f, n, a, l)")]
    InvalidMode(String),

    /// Unrecognized run direction (valid: upload, download)
    #[error("Unknown direction '{0}' (expected 'upload' or 'download')")]
    InvalidDirection(String),

    /// Identifier parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Malformed or incomplete configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
