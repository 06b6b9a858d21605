//! Remote catalog client port (driven/secondary port)
//!
//! Interface to the savefile catalog API. The primary implementation lives
//! in `savesync-api` and talks HTTP with bearer-token auth, but the trait
//! is transport-agnostic so tests can substitute in-memory fakes.
//!
//! ## Design Notes
//!
//! - Methods return a typed [`CatalogError`] rather than `anyhow::Error`
//!   because the engine classifies failures per path: the executor maps
//!   each variant onto a `FailureReason` and keeps going.
//! - [`RemoteConsole`] is a port-level DTO, not a domain entity; the run
//!   layer pairs it with a configured local root to build a
//!   [`Console`](crate::domain::console::Console).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::actions::FailureReason;
use crate::domain::newtypes::{ConsoleId, RecordId, SavePath};
use crate::domain::savefile::RemoteRecord;

/// Errors surfaced by catalog operations
///
/// All variants are recoverable at the per-path level; none of them abort
/// a reconciliation pass on their own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Credentials or token rejected (HTTP 401/403)
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The requested record or console does not exist (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog already holds a record with the same identity (HTTP 409)
    #[error("already exists: {0}")]
    Conflict(String),

    /// The per-call timeout elapsed before a response arrived
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS, or server-side failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The catalog answered with a body we could not interpret
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Returns true for failures worth retrying at the transport layer
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }
}

impl From<CatalogError> for FailureReason {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Auth(msg) => FailureReason::Auth(msg),
            CatalogError::NotFound(msg) => FailureReason::NotFound(msg),
            CatalogError::Timeout(msg) => FailureReason::Timeout(msg),
            CatalogError::Conflict(msg)
            | CatalogError::Transport(msg)
            | CatalogError::InvalidResponse(msg) => FailureReason::Transport(msg),
        }
    }
}

/// A console as the catalog knows it (no local root)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConsole {
    /// Catalog-assigned identifier
    pub id: ConsoleId,
    /// Console name, unique within the catalog
    pub name: String,
}

/// The payload of a savefile upload or update
#[derive(Debug, Clone)]
pub struct SavefilePayload {
    /// Path relative to the console's save root
    pub relative_path: SavePath,
    /// File content
    pub bytes: Vec<u8>,
    /// Local modification time, stored as the record's `updated_at`
    pub modified_at: DateTime<Utc>,
    /// SHA-256 hex digest of the content, when hashing is enabled
    pub content_hash: Option<String>,
}

/// Port trait for remote catalog operations
///
/// ## Implementation Notes
///
/// - Implementations own per-call timeouts and transport-level retries;
///   whatever still fails is returned as a single [`CatalogError`].
/// - `upload` has create-or-update semantics: when the catalog already
///   holds a record for the same console and path, the implementation
///   updates it in place instead of failing with [`CatalogError::Conflict`].
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Lists every console registered in the catalog
    async fn list_consoles(&self) -> Result<Vec<RemoteConsole>, CatalogError>;

    /// Looks up a console by name
    ///
    /// Returns `Ok(None)` when no console with that name exists; this is
    /// not an error.
    async fn find_console(&self, name: &str) -> Result<Option<RemoteConsole>, CatalogError>;

    /// Registers a new console
    async fn register_console(&self, name: &str) -> Result<RemoteConsole, CatalogError>;

    /// Lists all savefile records belonging to a console
    ///
    /// The catalog never returns two records with the same relative path
    /// for one console; the matcher still verifies this.
    async fn list_savefiles(&self, console: ConsoleId) -> Result<Vec<RemoteRecord>, CatalogError>;

    /// Creates a savefile record, or updates it in place if the console
    /// already has one for this path (implicit create-or-update)
    async fn upload(
        &self,
        console: ConsoleId,
        payload: &SavefilePayload,
    ) -> Result<RemoteRecord, CatalogError>;

    /// Replaces the content and metadata of an existing record
    async fn update(
        &self,
        record: RecordId,
        payload: &SavefilePayload,
    ) -> Result<RemoteRecord, CatalogError>;

    /// Downloads the stored content of a record
    async fn download(&self, record: RecordId) -> Result<Vec<u8>, CatalogError>;

    /// Deletes a record from the catalog
    async fn delete(&self, record: RecordId) -> Result<(), CatalogError>;
}
