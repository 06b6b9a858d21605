//! Savefile descriptors and the reconciled view
//!
//! Three value types flow through a reconciliation pass:
//!
//! - [`LocalFileDescriptor`] — a file found under a console's save root,
//!   rebuilt by every scan and never persisted
//! - [`RemoteRecord`] — a savefile record owned by the remote catalog,
//!   treated as immutable input for the duration of a pass
//! - [`MatchedPair`] — a local descriptor and remote record joined on
//!   their relative path
//!
//! The [`ReconciledView`] is the matcher's output: a total, disjoint
//! partition of every path into matched / local-only / remote-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{ConsoleId, RecordId, SavePath};

/// A savefile on the local filesystem, as seen by one scan
///
/// Ephemeral: reconstructed by every scan, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFileDescriptor {
    /// Path relative to the console's save root (the join key)
    pub relative_path: SavePath,
    /// File size in bytes
    pub size_bytes: u64,
    /// Last modification time on the local filesystem
    pub modified_at: DateTime<Utc>,
    /// SHA-256 hex digest of the content, when content hashing is enabled
    pub content_hash: Option<String>,
}

/// A savefile record owned by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Catalog-assigned record identifier
    pub id: RecordId,
    /// The console this record belongs to
    pub console_id: ConsoleId,
    /// Path relative to the console's save root (the join key)
    pub relative_path: SavePath,
    /// Stored size in bytes
    pub size_bytes: u64,
    /// Last update time in the catalog
    pub updated_at: DateTime<Utc>,
    /// Monotonic version counter maintained by the catalog
    pub version: u32,
}

/// A local descriptor paired with its remote record by relative path
///
/// Exists only inside one reconciliation pass. `baseline` is the last-synced
/// timestamp when a collaborator tracks one; the matcher itself leaves it
/// `None`, in which case timestamp ties always resolve to a skip and a
/// conflict is never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    /// The local side of the pair
    pub local: LocalFileDescriptor,
    /// The remote side of the pair
    pub remote: RemoteRecord,
    /// Last-synced timestamp, if a baseline is tracked for this path
    pub baseline: Option<DateTime<Utc>>,
}

impl MatchedPair {
    /// Pairs a local descriptor with a remote record, with no baseline
    pub fn new(local: LocalFileDescriptor, remote: RemoteRecord) -> Self {
        Self {
            local,
            remote,
            baseline: None,
        }
    }

    /// Attaches a last-synced baseline timestamp to this pair
    #[must_use]
    pub fn with_baseline(mut self, baseline: DateTime<Utc>) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// The pair's join key
    pub fn path(&self) -> &SavePath {
        &self.local.relative_path
    }
}

/// The matcher's partition of all paths for one reconciliation pass
///
/// The three sets are pairwise disjoint and their union covers every path
/// present on either side.
#[derive(Debug, Clone, Default)]
pub struct ReconciledView {
    /// Paths present on both sides
    pub matched: Vec<MatchedPair>,
    /// Paths present only under the local save root
    pub local_only: Vec<LocalFileDescriptor>,
    /// Paths present only in the remote catalog
    pub remote_only: Vec<RemoteRecord>,
}

impl ReconciledView {
    /// Total number of distinct paths in the view
    pub fn len(&self) -> usize {
        self.matched.len() + self.local_only.len() + self.remote_only.len()
    }

    /// Returns true if the view contains no paths at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every path in the view, across all three sets
    pub fn paths(&self) -> impl Iterator<Item = &SavePath> {
        self.matched
            .iter()
            .map(|p| p.path())
            .chain(self.local_only.iter().map(|l| &l.relative_path))
            .chain(self.remote_only.iter().map(|r| &r.relative_path))
    }
}
