//! Decision engine - computes one action per path
//!
//! Given a reconciled view, a crawl mode, an action mode, and a direction,
//! [`decide`] produces the complete action map for a pass. It is a pure
//! function: no I/O, no clock reads, no suspension. Running it twice on
//! identical inputs yields identical maps, and the `BTreeMap` output keeps
//! iteration order deterministic.
//!
//! ## Policy matrix
//!
//! For matched pairs (direction selects the authoritative side):
//!
//! | crawl \ action | force | update | new | auto | all |
//! |---|---|---|---|---|---|
//! | new            | skip  | skip   | skip| skip | skip |
//! | auto           | by timestamp | by timestamp | skip | by timestamp | by timestamp |
//! | update/force/all | overwrite | by timestamp | skip | by timestamp | overwrite |
//!
//! Unmatched paths are eligible under every crawl mode. `force`/`update`
//! transfer them only in the run direction; `new`/`auto`/`all` create the
//! missing side unconditionally (registration and download are
//! non-destructive).

use std::collections::BTreeMap;

use savesync_core::domain::actions::{OverwriteSource, SyncAction};
use savesync_core::domain::modes::{ActionMode, CrawlMode, Direction};
use savesync_core::domain::newtypes::SavePath;
use savesync_core::domain::savefile::{MatchedPair, ReconciledView};

/// Computes the action map for one reconciliation pass.
///
/// Every path in the view receives exactly one action; paths a policy
/// declines to touch receive [`SyncAction::Skip`] so the output map is
/// always total over the view.
pub fn decide(
    view: &ReconciledView,
    crawl: CrawlMode,
    action: ActionMode,
    direction: Direction,
) -> BTreeMap<SavePath, SyncAction> {
    let mut actions = BTreeMap::new();

    for pair in &view.matched {
        actions.insert(
            pair.path().clone(),
            decide_matched(pair, crawl, action, direction),
        );
    }
    for descriptor in &view.local_only {
        actions.insert(
            descriptor.relative_path.clone(),
            decide_local_only(action, direction),
        );
    }
    for record in &view.remote_only {
        actions.insert(
            record.relative_path.clone(),
            decide_remote_only(action, direction),
        );
    }

    actions
}

/// Action for a path present on both sides.
fn decide_matched(
    pair: &MatchedPair,
    crawl: CrawlMode,
    action: ActionMode,
    direction: Direction,
) -> SyncAction {
    // Crawl mode `new` never touches matched pairs; action mode `new`
    // never overwrites an already-synced file under any crawl mode.
    if crawl == CrawlMode::New || action == ActionMode::New {
        return SyncAction::Skip;
    }

    // Crawl mode `auto` defers every remaining overwrite-vs-skip choice
    // to the timestamp comparison, whatever the action mode says.
    if crawl == CrawlMode::Auto {
        return compare_timestamps(pair, direction);
    }

    match action {
        ActionMode::Force | ActionMode::All => {
            SyncAction::Overwrite(OverwriteSource::from(direction))
        }
        ActionMode::Update | ActionMode::Auto => compare_timestamps(pair, direction),
        ActionMode::New => SyncAction::Skip,
    }
}

/// Timestamp comparison for a matched pair.
///
/// Overwrites only when the authoritative side is strictly newer; equal or
/// older resolves to a skip. A conflict is reported only when the pair
/// carries a baseline and both sides have moved past it (divergent edits);
/// without a baseline the comparison alone can never prove divergence.
fn compare_timestamps(pair: &MatchedPair, direction: Direction) -> SyncAction {
    let local = pair.local.modified_at;
    let remote = pair.remote.updated_at;

    if let Some(baseline) = pair.baseline {
        if local > baseline && remote > baseline {
            return SyncAction::Conflict;
        }
    }

    let authoritative_is_newer = match direction {
        Direction::Upload => local > remote,
        Direction::Download => remote > local,
    };

    if authoritative_is_newer {
        SyncAction::Overwrite(OverwriteSource::from(direction))
    } else {
        SyncAction::Skip
    }
}

/// Action for a path present only under the local save root.
fn decide_local_only(action: ActionMode, direction: Direction) -> SyncAction {
    match action {
        ActionMode::Force | ActionMode::Update => {
            if direction == Direction::Upload {
                SyncAction::Upload
            } else {
                SyncAction::Skip
            }
        }
        ActionMode::New | ActionMode::Auto | ActionMode::All => SyncAction::Register,
    }
}

/// Action for a path present only in the remote catalog.
fn decide_remote_only(action: ActionMode, direction: Direction) -> SyncAction {
    match action {
        ActionMode::Force | ActionMode::Update => {
            if direction == Direction::Download {
                SyncAction::Download
            } else {
                SyncAction::Skip
            }
        }
        ActionMode::New | ActionMode::Auto | ActionMode::All => SyncAction::Download,
    }
}
