//! Executor - applies the decided actions
//!
//! Takes the action map for one console and applies it through the catalog
//! client and the local save store. Actions are dispatched across a bounded
//! worker pool; every path gets exactly one [`ActionResult`], and one
//! path's failure never aborts the rest of the batch.
//!
//! ## Concurrency
//!
//! Dispatch is gated by a semaphore sized to `max_concurrent`. Results flow
//! back over an mpsc channel (the append-only collector), so workers share
//! no mutable state. No two workers ever target the same relative path
//! because the action map holds one entry per path.
//!
//! ## Cancellation
//!
//! A [`CancellationToken`] stops the dispatch of new actions; in-flight
//! transfers finish or fail on their own. Actions that never dispatched
//! report `Failed(Cancelled)` so the result list stays total.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use savesync_core::domain::actions::{
    ActionOutcome, ActionResult, FailureReason, OverwriteSource, SyncAction,
};
use savesync_core::domain::console::Console;
use savesync_core::domain::newtypes::SavePath;
use savesync_core::domain::savefile::{LocalFileDescriptor, ReconciledView, RemoteRecord};
use savesync_core::ports::catalog::{CatalogClient, SavefilePayload};
use savesync_core::ports::save_store::SaveStore;

/// Per-path context a worker needs to apply an action.
#[derive(Clone)]
struct PathContext {
    local: Option<LocalFileDescriptor>,
    remote: Option<RemoteRecord>,
}

/// Applies sync actions through the catalog and the local store.
pub struct Executor {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn SaveStore>,
    /// Maximum concurrent per-file transfers
    max_concurrent: usize,
}

impl Executor {
    /// Creates an executor over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn SaveStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Applies every action in the map, returning one result per path.
    ///
    /// The returned vector is sorted by path. Failures are per-path; this
    /// method itself never fails.
    pub async fn execute(
        &self,
        console: &Console,
        view: &ReconciledView,
        actions: BTreeMap<SavePath, SyncAction>,
        cancel: &CancellationToken,
    ) -> Vec<ActionResult> {
        let mut contexts: HashMap<SavePath, PathContext> = HashMap::new();
        for pair in &view.matched {
            contexts.insert(
                pair.path().clone(),
                PathContext {
                    local: Some(pair.local.clone()),
                    remote: Some(pair.remote.clone()),
                },
            );
        }
        for local in &view.local_only {
            contexts.insert(
                local.relative_path.clone(),
                PathContext {
                    local: Some(local.clone()),
                    remote: None,
                },
            );
        }
        for remote in &view.remote_only {
            contexts.insert(
                remote.relative_path.clone(),
                PathContext {
                    local: None,
                    remote: Some(remote.clone()),
                },
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::unbounded_channel::<ActionResult>();
        let mut results = Vec::with_capacity(actions.len());

        info!(
            console = console.name(),
            actions = actions.len(),
            workers = self.max_concurrent,
            "dispatching actions"
        );

        for (path, action) in actions {
            // No-ops are resolved inline: they perform no I/O and always
            // succeed, even on a cancelled run.
            if action.is_noop() {
                results.push(ActionResult::success(path, action));
                continue;
            }

            // Biased so a cancellation observed before dispatch always wins
            // over an available permit.
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                debug!(path = %path, "run cancelled before dispatch");
                results.push(ActionResult::failed(path, action, FailureReason::Cancelled));
                continue;
            };

            let catalog = self.catalog.clone();
            let store = self.store.clone();
            let console = console.clone();
            let context = contexts.get(&path).cloned();
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let result = apply_action(catalog, store, &console, path, action, context).await;
                // The receiver outlives every worker; a send failure means
                // the whole run is being torn down.
                let _ = tx.send(result);
            });
        }

        drop(tx);
        while let Some(result) = rx.recv().await {
            if let ActionOutcome::Failed(ref reason) = result.outcome {
                warn!(path = %result.path, action = %result.action, %reason, "action failed");
            }
            results.push(result);
        }

        results.sort_by(|a, b| a.path.cmp(&b.path));
        results
    }
}

/// Applies a single non-noop action. Always returns a result; never panics
/// the worker.
async fn apply_action(
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn SaveStore>,
    console: &Console,
    path: SavePath,
    action: SyncAction,
    context: Option<PathContext>,
) -> ActionResult {
    let context = context.unwrap_or(PathContext {
        local: None,
        remote: None,
    });

    match action {
        SyncAction::Upload | SyncAction::Register => {
            send_local(catalog, store, console, path, action, context.local, None).await
        }
        SyncAction::Overwrite(OverwriteSource::LocalToRemote) => {
            let record = context.remote.as_ref().map(|r| r.id);
            send_local(catalog, store, console, path, action, context.local, record).await
        }
        SyncAction::Download | SyncAction::Overwrite(OverwriteSource::RemoteToLocal) => {
            fetch_remote(catalog, store, console, path, action, context.remote).await
        }
        SyncAction::Skip | SyncAction::Conflict => ActionResult::success(path, action),
    }
}

/// Reads a local savefile and sends it to the catalog.
///
/// With a record id this is an update of a matched pair; without one it is
/// a create (or an implicit create-or-update for plain uploads). The local
/// file is never mutated.
async fn send_local(
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn SaveStore>,
    console: &Console,
    path: SavePath,
    action: SyncAction,
    local: Option<LocalFileDescriptor>,
    record: Option<savesync_core::domain::newtypes::RecordId>,
) -> ActionResult {
    let Some(local) = local else {
        return ActionResult::failed(
            path.clone(),
            action,
            FailureReason::Io(format!("no local file known for '{path}'")),
        );
    };

    let bytes = match store.read(console.local_root(), &path).await {
        Ok(bytes) => bytes,
        Err(err) => return ActionResult::failed(path, action, err.into()),
    };

    let payload = SavefilePayload {
        relative_path: path.clone(),
        bytes,
        modified_at: local.modified_at,
        content_hash: local.content_hash.clone(),
    };

    let sent = match record {
        Some(record_id) => catalog.update(record_id, &payload).await,
        None => catalog.upload(console.id(), &payload).await,
    };

    match sent {
        Ok(stored) => {
            debug!(
                path = %path,
                record = %stored.id,
                size = stored.size_bytes,
                "savefile sent to catalog"
            );
            ActionResult::success(path, action)
        }
        Err(err) => ActionResult::failed(path, action, err.into()),
    }
}

/// Fetches a record's content and writes it below the local save root.
async fn fetch_remote(
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn SaveStore>,
    console: &Console,
    path: SavePath,
    action: SyncAction,
    remote: Option<RemoteRecord>,
) -> ActionResult {
    let Some(remote) = remote else {
        return ActionResult::failed(
            path.clone(),
            action,
            FailureReason::Io(format!("no remote record known for '{path}'")),
        );
    };

    let bytes = match catalog.download(remote.id).await {
        Ok(bytes) => bytes,
        Err(err) => return ActionResult::failed(path, action, err.into()),
    };

    match store
        .write_atomic(console.local_root(), &path, &bytes, remote.updated_at)
        .await
    {
        Ok(()) => {
            debug!(path = %path, bytes = bytes.len(), "savefile written locally");
            ActionResult::success(path, action)
        }
        Err(err) => ActionResult::failed(path, action, err.into()),
    }
}
