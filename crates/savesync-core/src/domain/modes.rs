//! Reconciliation policy enums
//!
//! A reconciliation pass is parameterized by three values:
//!
//! - [`CrawlMode`] — which paths are eligible for action at all
//! - [`ActionMode`] — what to do with each eligible path
//! - [`Direction`] — which side is authoritative for matched-pair overwrites
//!
//! Both mode axes share the single-letter code enumeration `u`/`f`/`n`/`a`/`l`
//! accepted on the CLI and in configuration. Codes are parsed once at the
//! configuration edge; everything downstream dispatches on the enums.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Selects which paths a reconciliation pass may act on.
///
/// `New` restricts eligibility to unmatched paths: anything already present
/// on both sides is skipped untouched. The remaining modes consider matched
/// pairs as well; `Auto` additionally defers every matched-pair decision to
/// timestamp comparison regardless of the action mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlMode {
    /// Consider matched pairs, acting only where an update is needed
    Update,
    /// Consider matched pairs unconditionally
    Force,
    /// Only unmatched paths are eligible; matched pairs are never touched
    New,
    /// Everything is eligible, but matched pairs always go through
    /// timestamp comparison (least-destructive default)
    #[default]
    Auto,
    /// Everything is eligible with no filtering
    All,
}

/// Selects the operation applied to each eligible path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    /// Overwrite matched pairs only when the authoritative side is strictly
    /// newer; transfer unmatched paths only in the run direction
    Update,
    /// Always overwrite matched pairs in the run direction, regardless of
    /// timestamps; transfer unmatched paths only in the run direction
    Force,
    /// Never overwrite; create what is missing on either side
    New,
    /// Timestamp-compared overwrites plus creation of missing paths
    #[default]
    Auto,
    /// Unconditional overwrites plus creation of missing paths.
    /// The most destructive mode; must be selected explicitly.
    All,
}

/// Which side a run treats as the source of truth for overwrites.
///
/// Direction does not gate creation: local-only registrations and
/// remote-only downloads happen in any creation-permitting mode. It only
/// decides which way a matched pair is overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Local files are authoritative; overwrites go local → remote
    #[default]
    Upload,
    /// Remote records are authoritative; overwrites go remote → local
    Download,
}

impl CrawlMode {
    /// Parse a single-letter mode code (`u`, `f`, `n`, `a`, `l`)
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "u" => Ok(Self::Update),
            "f" => Ok(Self::Force),
            "n" => Ok(Self::New),
            "a" => Ok(Self::Auto),
            "l" => Ok(Self::All),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }

    /// The single-letter code for this mode
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            Self::Update => 'u',
            Self::Force => 'f',
            Self::New => 'n',
            Self::Auto => 'a',
            Self::All => 'l',
        }
    }
}

impl ActionMode {
    /// Parse a single-letter mode code (`u`, `f`, `n`, `a`, `l`)
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "u" => Ok(Self::Update),
            "f" => Ok(Self::Force),
            "n" => Ok(Self::New),
            "a" => Ok(Self::Auto),
            "l" => Ok(Self::All),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }

    /// The single-letter code for this mode
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            Self::Update => 'u',
            Self::Force => 'f',
            Self::New => 'n',
            Self::Auto => 'a',
            Self::All => 'l',
        }
    }
}

impl FromStr for CrawlMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl FromStr for ActionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" | "up" => Ok(Self::Upload),
            "download" | "down" => Ok(Self::Download),
            other => Err(DomainError::InvalidDirection(other.to_string())),
        }
    }
}

impl Display for CrawlMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Force => write!(f, "force"),
            Self::New => write!(f, "new"),
            Self::Auto => write!(f, "auto"),
            Self::All => write!(f, "all"),
        }
    }
}

impl Display for ActionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Force => write!(f, "force"),
            Self::New => write!(f, "new"),
            Self::Auto => write!(f, "auto"),
            Self::All => write!(f, "all"),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Download => write!(f, "download"),
        }
    }
}
