//! Sync actions and per-path results
//!
//! [`SyncAction`] is the sole output contract between the decision engine
//! and the executor: one action per path, computed up front, never
//! persisted. [`ActionResult`] is the executor's per-path outcome; a run
//! always produces exactly one result for every decided path, whether the
//! transfer succeeded, failed, or was never dispatched.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::modes::Direction;
use super::newtypes::SavePath;

/// The source of truth for an overwrite of a matched pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteSource {
    /// The local file overwrites the remote record
    LocalToRemote,
    /// The remote record overwrites the local file
    RemoteToLocal,
}

impl From<Direction> for OverwriteSource {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Upload => Self::LocalToRemote,
            Direction::Download => Self::RemoteToLocal,
        }
    }
}

impl Display for OverwriteSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalToRemote => write!(f, "local->remote"),
            Self::RemoteToLocal => write!(f, "remote->local"),
        }
    }
}

/// The operation the executor will apply to one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Send a local-only file to the catalog (implicit create-or-update)
    Upload,
    /// Fetch a remote-only record to the local save root
    Download,
    /// Replace one side of a matched pair with the other
    Overwrite(OverwriteSource),
    /// Create the catalog record for a local-only file, then upload it
    Register,
    /// Leave the path untouched
    Skip,
    /// Divergent edits on both sides; requires operator attention,
    /// never auto-resolved
    Conflict,
}

impl SyncAction {
    /// Returns true for actions that perform no I/O
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Skip | Self::Conflict)
    }

    /// Returns true for actions that write to the local filesystem
    pub fn mutates_local(&self) -> bool {
        matches!(
            self,
            Self::Download | Self::Overwrite(OverwriteSource::RemoteToLocal)
        )
    }

    /// Returns true for actions that write to the remote catalog
    pub fn mutates_remote(&self) -> bool {
        matches!(
            self,
            Self::Upload | Self::Register | Self::Overwrite(OverwriteSource::LocalToRemote)
        )
    }
}

impl Display for SyncAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Download => write!(f, "download"),
            Self::Overwrite(source) => write!(f, "overwrite ({source})"),
            Self::Register => write!(f, "register"),
            Self::Skip => write!(f, "skip"),
            Self::Conflict => write!(f, "conflict"),
        }
    }
}

/// Why a per-path action failed
///
/// Every variant is a per-path condition: the run records it and moves on
/// to the remaining paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The catalog rejected our credentials or token
    Auth(String),
    /// The catalog has no such record or console
    NotFound(String),
    /// The per-call network timeout elapsed
    Timeout(String),
    /// Transport-level failure (connection, TLS, 5xx, malformed response)
    Transport(String),
    /// Local filesystem failure
    Io(String),
    /// The run was cancelled before this action was dispatched
    Cancelled,
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "auth: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of applying one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action was applied (no-ops count as success)
    Success,
    /// The action failed; the rest of the run continued
    Failed(FailureReason),
}

impl ActionOutcome {
    /// Returns true if the action succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Per-path result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The path the action targeted
    pub path: SavePath,
    /// The action that was decided for this path
    pub action: SyncAction,
    /// What happened when the executor applied it
    pub outcome: ActionOutcome,
}

impl ActionResult {
    /// Shorthand for a successful result
    pub fn success(path: SavePath, action: SyncAction) -> Self {
        Self {
            path,
            action,
            outcome: ActionOutcome::Success,
        }
    }

    /// Shorthand for a failed result
    pub fn failed(path: SavePath, action: SyncAction, reason: FailureReason) -> Self {
        Self {
            path,
            action,
            outcome: ActionOutcome::Failed(reason),
        }
    }
}
