//! Console domain entity
//!
//! A console is a registered game-platform configuration: it owns exactly
//! one local save directory and zero-or-more remote savefile records. The
//! catalog assigns its identifier at registration; the local root comes
//! from configuration on this machine and is never stored remotely.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::newtypes::ConsoleId;

/// A registered game console with its local save directory
///
/// Created via catalog registration; mutated only by rename. The engine
/// never deletes consoles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Console {
    /// Catalog-assigned identifier
    id: ConsoleId,
    /// Human-readable console name (e.g. "ps2", "gamecube")
    name: String,
    /// Root directory of this console's savefiles on this machine
    local_root: PathBuf,
}

impl Console {
    /// Creates a Console from a catalog identity and a local save root
    pub fn new(id: ConsoleId, name: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            local_root: local_root.into(),
        }
    }

    /// Returns the catalog-assigned identifier
    pub fn id(&self) -> ConsoleId {
        self.id
    }

    /// Returns the console name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the local save root directory
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// Renames the console. The only mutation a console supports.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
