//! Matcher - joins local descriptors with remote records
//!
//! Produces the [`ReconciledView`] for one pass: every path present on
//! either side lands in exactly one of {matched, local-only, remote-only}.
//! The join key is the normalized [`SavePath`]; a duplicate key on either
//! side is a data-integrity problem and fails the whole pass rather than
//! silently picking one of the duplicates.

use std::collections::{BTreeMap, BTreeSet};

use savesync_core::domain::errors::DomainError;
use savesync_core::domain::newtypes::SavePath;
use savesync_core::domain::savefile::{
    LocalFileDescriptor, MatchedPair, ReconciledView, RemoteRecord,
};

/// Partitions local files and remote records into a reconciled view.
///
/// Pure function of its inputs; performs no I/O. Output vectors are sorted
/// by path so downstream processing is deterministic regardless of scan or
/// catalog ordering.
///
/// # Errors
///
/// Returns [`DomainError::DuplicatePath`] naming the offending path when
/// two local descriptors or two remote records share a relative path.
pub fn reconcile(
    local_files: Vec<LocalFileDescriptor>,
    remote_records: Vec<RemoteRecord>,
) -> Result<ReconciledView, DomainError> {
    let mut local_by_path: BTreeMap<SavePath, LocalFileDescriptor> = BTreeMap::new();
    for descriptor in local_files {
        let path = descriptor.relative_path.clone();
        if local_by_path.insert(path.clone(), descriptor).is_some() {
            return Err(DomainError::DuplicatePath(path.as_str().to_string()));
        }
    }

    let mut seen_remote: BTreeSet<SavePath> = BTreeSet::new();
    let mut matched = Vec::new();
    let mut remote_only = Vec::new();

    for record in remote_records {
        if !seen_remote.insert(record.relative_path.clone()) {
            return Err(DomainError::DuplicatePath(
                record.relative_path.as_str().to_string(),
            ));
        }
        match local_by_path.remove(&record.relative_path) {
            Some(local) => matched.push(MatchedPair::new(local, record)),
            None => remote_only.push(record),
        }
    }

    // Whatever the remote side did not claim is local-only.
    let local_only: Vec<LocalFileDescriptor> = local_by_path.into_values().collect();

    matched.sort_by(|a, b| a.path().cmp(b.path()));
    remote_only.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(ReconciledView {
        matched,
        local_only,
        remote_only,
    })
}
