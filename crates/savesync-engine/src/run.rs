//! Reconciliation run orchestration
//!
//! One [`ReconcileRunner`] drives whole passes: for each configured
//! console it resolves (or registers) the console in the catalog, scans
//! the local save root, lists the remote records, matches, decides, and
//! executes. Consoles are independent directory/record domains, so
//! multiple consoles may run concurrently, bounded by
//! `max_concurrent_consoles`.
//!
//! Per-file failures are recorded in the pass's result list; only
//! integrity-violating conditions (duplicate join keys, an unregistered
//! console in a non-creating mode, an unreadable save root) fail a
//! console's pass as a whole. One console's fatal error never stops the
//! other consoles.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use savesync_core::config::{ConsoleEntry, TransferConfig};
use savesync_core::domain::actions::{ActionResult, SyncAction};
use savesync_core::domain::console::Console;
use savesync_core::domain::modes::{ActionMode, CrawlMode, Direction};
use savesync_core::domain::newtypes::SavePath;
use savesync_core::ports::catalog::CatalogClient;
use savesync_core::ports::save_store::SaveStore;

use crate::decision::decide;
use crate::executor::Executor;
use crate::matcher::reconcile;

/// Policies for one reconciliation run, shared by every console in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Which paths are eligible for action
    pub crawl: CrawlMode,
    /// What to do with each eligible path
    pub action: ActionMode,
    /// Authoritative side for matched-pair overwrites
    pub direction: Direction,
    /// Stop after deciding; report planned actions without executing
    pub dry_run: bool,
}

/// What a console's pass produced.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Dry run: the actions that would have been executed
    Planned(BTreeMap<SavePath, SyncAction>),
    /// Real run: one result per decided path
    Executed(Vec<ActionResult>),
}

/// A completed pass for one console.
#[derive(Debug, Clone)]
pub struct ConsoleRun {
    /// The console the pass operated on
    pub console: Console,
    /// Planned actions or executed results
    pub outcome: RunOutcome,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

/// Drives reconciliation passes against a catalog and a local save store.
#[derive(Clone)]
pub struct ReconcileRunner {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn SaveStore>,
    max_concurrent: usize,
    max_concurrent_consoles: usize,
}

impl ReconcileRunner {
    /// Creates a runner over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn SaveStore>,
        transfer: &TransferConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            max_concurrent: transfer.max_concurrent.max(1),
            max_concurrent_consoles: transfer.max_concurrent_consoles.max(1),
        }
    }

    /// Runs one reconciliation pass for a single console.
    ///
    /// # Errors
    ///
    /// Fails before any transfer on: an unregistered console in a
    /// non-creating crawl mode, an unreadable save root, or a duplicate
    /// join key from the scanner or the catalog. Per-file transfer
    /// failures do not error; they are recorded in the result list.
    #[tracing::instrument(skip(self, entry, cancel), fields(console = %entry.name))]
    pub async fn run_console(
        &self,
        entry: &ConsoleEntry,
        opts: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<ConsoleRun> {
        let start = std::time::Instant::now();

        let console = self.resolve_console(entry, opts.crawl).await?;

        info!(
            console = console.name(),
            id = %console.id(),
            root = %console.local_root().display(),
            crawl = %opts.crawl,
            action = %opts.action,
            direction = %opts.direction,
            "starting reconciliation pass"
        );

        self.store
            .ensure_root(console.local_root())
            .await
            .context("Failed to prepare local save root")?;

        let local_files = self
            .store
            .scan(console.local_root())
            .await
            .context("Failed to scan local save root")?;

        let remote_records = self
            .catalog
            .list_savefiles(console.id())
            .await
            .context("Failed to list remote savefiles")?;

        info!(
            local = local_files.len(),
            remote = remote_records.len(),
            "inventories collected"
        );

        let view = reconcile(local_files, remote_records)
            .context("Reconciliation failed on ambiguous join key")?;

        let actions = decide(&view, opts.crawl, opts.action, opts.direction);

        if opts.dry_run {
            info!(planned = actions.len(), "dry run, skipping execution");
            return Ok(ConsoleRun {
                console,
                outcome: RunOutcome::Planned(actions),
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let executor = Executor::new(self.catalog.clone(), self.store.clone(), self.max_concurrent);
        let results = executor.execute(&console, &view, actions, cancel).await;

        info!(results = results.len(), "reconciliation pass finished");

        Ok(ConsoleRun {
            console,
            outcome: RunOutcome::Executed(results),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Runs passes for every configured console, bounded-concurrently.
    ///
    /// Returns one entry per console in input order: the console name and
    /// its pass outcome or fatal error.
    pub async fn run_all(
        &self,
        entries: &[ConsoleEntry],
        opts: &RunOptions,
        cancel: &CancellationToken,
    ) -> Vec<(String, Result<ConsoleRun>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_consoles));
        let mut join_set = JoinSet::new();

        for (index, entry) in entries.iter().cloned().enumerate() {
            let runner = self.clone();
            let semaphore = semaphore.clone();
            let opts = *opts;
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let run = runner.run_console(&entry, &opts, &cancel).await;
                (index, entry.name, run)
            });
        }

        let mut runs: Vec<Option<(String, Result<ConsoleRun>)>> =
            (0..entries.len()).map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, name, run)) => runs[index] = Some((name, run)),
                Err(err) => warn!(error = %err, "console task failed to join"),
            }
        }

        runs.into_iter().flatten().collect()
    }

    /// Looks the console up in the catalog, registering it when missing
    /// and the crawl mode permits creation.
    async fn resolve_console(&self, entry: &ConsoleEntry, crawl: CrawlMode) -> Result<Console> {
        let found = self
            .catalog
            .find_console(&entry.name)
            .await
            .context("Failed to look up console")?;

        let remote = match found {
            Some(remote) => remote,
            None => {
                let creates = matches!(crawl, CrawlMode::New | CrawlMode::Auto | CrawlMode::All);
                if !creates {
                    anyhow::bail!(
                        "console '{}' is not registered in the catalog \
                         (crawl mode '{}' does not register consoles)",
                        entry.name,
                        crawl
                    );
                }
                info!(console = %entry.name, "registering console in catalog");
                self.catalog
                    .register_console(&entry.name)
                    .await
                    .context("Failed to register console")?
            }
        };

        Ok(Console::new(remote.id, remote.name, entry.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use savesync_core::domain::newtypes::{ConsoleId, RecordId};
    use savesync_core::domain::savefile::{LocalFileDescriptor, RemoteRecord};
    use savesync_core::ports::catalog::{CatalogError, RemoteConsole, SavefilePayload};
    use savesync_core::ports::save_store::StoreError;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    fn ts(offset: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(offset)
    }

    fn entry(name: &str) -> ConsoleEntry {
        ConsoleEntry {
            name: name.to_string(),
            path: PathBuf::from(format!("/srv/saves/{name}")),
        }
    }

    /// Catalog fake with a mutable console list and fixed records.
    struct FakeCatalog {
        consoles: Mutex<Vec<RemoteConsole>>,
        records: Vec<RemoteRecord>,
        next_id: AtomicI64,
    }

    impl FakeCatalog {
        fn new(consoles: Vec<RemoteConsole>, records: Vec<RemoteRecord>) -> Self {
            Self {
                consoles: Mutex::new(consoles),
                records,
                next_id: AtomicI64::new(100),
            }
        }

        fn empty() -> Self {
            Self::new(vec![], vec![])
        }
    }

    #[async_trait::async_trait]
    impl CatalogClient for FakeCatalog {
        async fn list_consoles(&self) -> Result<Vec<RemoteConsole>, CatalogError> {
            Ok(self.consoles.lock().unwrap().clone())
        }

        async fn find_console(&self, name: &str) -> Result<Option<RemoteConsole>, CatalogError> {
            Ok(self
                .consoles
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.name == name)
                .cloned())
        }

        async fn register_console(&self, name: &str) -> Result<RemoteConsole, CatalogError> {
            let console = RemoteConsole {
                id: ConsoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
                name: name.to_string(),
            };
            self.consoles.lock().unwrap().push(console.clone());
            Ok(console)
        }

        async fn list_savefiles(
            &self,
            console: ConsoleId,
        ) -> Result<Vec<RemoteRecord>, CatalogError> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.console_id == console)
                .cloned()
                .collect())
        }

        async fn upload(
            &self,
            console: ConsoleId,
            payload: &SavefilePayload,
        ) -> Result<RemoteRecord, CatalogError> {
            Ok(RemoteRecord {
                id: RecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
                console_id: console,
                relative_path: payload.relative_path.clone(),
                size_bytes: payload.bytes.len() as u64,
                updated_at: payload.modified_at,
                version: 1,
            })
        }

        async fn update(
            &self,
            record: RecordId,
            payload: &SavefilePayload,
        ) -> Result<RemoteRecord, CatalogError> {
            Ok(RemoteRecord {
                id: record,
                console_id: ConsoleId::new(1),
                relative_path: payload.relative_path.clone(),
                size_bytes: payload.bytes.len() as u64,
                updated_at: payload.modified_at,
                version: 2,
            })
        }

        async fn download(&self, _record: RecordId) -> Result<Vec<u8>, CatalogError> {
            Ok(b"remote-bytes".to_vec())
        }

        async fn delete(&self, _record: RecordId) -> Result<(), CatalogError> {
            Ok(())
        }
    }

    /// Save store fake with a preset scan result.
    #[derive(Default)]
    struct FakeStore {
        descriptors: Vec<LocalFileDescriptor>,
        files: Mutex<std::collections::HashMap<String, Vec<u8>>>,
    }

    impl FakeStore {
        fn with_descriptors(descriptors: Vec<LocalFileDescriptor>) -> Self {
            let files = descriptors
                .iter()
                .map(|d| (d.relative_path.as_str().to_string(), b"data".to_vec()))
                .collect();
            Self {
                descriptors,
                files: Mutex::new(files),
            }
        }
    }

    #[async_trait::async_trait]
    impl SaveStore for FakeStore {
        async fn scan(&self, _root: &Path) -> Result<Vec<LocalFileDescriptor>, StoreError> {
            Ok(self.descriptors.clone())
        }

        async fn read(&self, _root: &Path, path: &SavePath) -> Result<Vec<u8>, StoreError> {
            self.files
                .lock()
                .unwrap()
                .get(path.as_str())
                .cloned()
                .ok_or_else(|| StoreError::Read {
                    path: path.as_str().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                })
        }

        async fn write_atomic(
            &self,
            _root: &Path,
            path: &SavePath,
            bytes: &[u8],
            _mtime: chrono::DateTime<Utc>,
        ) -> Result<(), StoreError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.as_str().to_string(), bytes.to_vec());
            Ok(())
        }

        async fn ensure_root(&self, _root: &Path) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn local(path: &str, offset: i64) -> LocalFileDescriptor {
        LocalFileDescriptor {
            relative_path: SavePath::new(path).unwrap(),
            size_bytes: 4,
            modified_at: ts(offset),
            content_hash: None,
        }
    }

    fn record(id: i64, console: i64, path: &str, offset: i64) -> RemoteRecord {
        RemoteRecord {
            id: RecordId::new(id),
            console_id: ConsoleId::new(console),
            relative_path: SavePath::new(path).unwrap(),
            size_bytes: 4,
            updated_at: ts(offset),
            version: 1,
        }
    }

    fn runner(catalog: FakeCatalog, store: FakeStore) -> ReconcileRunner {
        ReconcileRunner::new(
            Arc::new(catalog),
            Arc::new(store),
            &TransferConfig::default(),
        )
    }

    fn ps2_console() -> RemoteConsole {
        RemoteConsole {
            id: ConsoleId::new(1),
            name: "ps2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unregistered_console_fails_in_update_mode() {
        let runner = runner(FakeCatalog::empty(), FakeStore::default());
        let opts = RunOptions {
            crawl: CrawlMode::Update,
            ..RunOptions::default()
        };

        let err = runner
            .run_console(&entry("ps2"), &opts, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[tokio::test]
    async fn test_auto_mode_registers_missing_console() {
        let runner = runner(FakeCatalog::empty(), FakeStore::default());
        let opts = RunOptions::default(); // auto/auto/upload

        let run = runner
            .run_console(&entry("ps2"), &opts, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.console.name(), "ps2");
        match run.outcome {
            RunOutcome::Executed(results) => assert!(results.is_empty()),
            RunOutcome::Planned(_) => panic!("expected an executed run"),
        }
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_executing() {
        let catalog = FakeCatalog::new(
            vec![ps2_console()],
            vec![record(10, 1, "save2.bin", 0)],
        );
        let store = FakeStore::with_descriptors(vec![local("save1.bin", 0)]);
        let runner = runner(catalog, store);

        let opts = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };

        let run = runner
            .run_console(&entry("ps2"), &opts, &CancellationToken::new())
            .await
            .unwrap();

        match run.outcome {
            RunOutcome::Planned(actions) => {
                assert_eq!(actions.len(), 2);
                assert_eq!(
                    actions[&SavePath::new("save1.bin").unwrap()],
                    SyncAction::Register
                );
                assert_eq!(
                    actions[&SavePath::new("save2.bin").unwrap()],
                    SyncAction::Download
                );
            }
            RunOutcome::Executed(_) => panic!("dry run must not execute"),
        }
    }

    #[tokio::test]
    async fn test_full_pass_executes_every_path() {
        let catalog = FakeCatalog::new(
            vec![ps2_console()],
            vec![
                record(10, 1, "save1.bin", 10), // matched, remote newer
                record(11, 1, "save2.bin", 0),  // remote only
            ],
        );
        let store = FakeStore::with_descriptors(vec![
            local("save1.bin", 0),
            local("save3.bin", 0), // local only
        ]);
        let runner = runner(catalog, store);

        let opts = RunOptions {
            direction: Direction::Download,
            ..RunOptions::default()
        };

        let run = runner
            .run_console(&entry("ps2"), &opts, &CancellationToken::new())
            .await
            .unwrap();

        let RunOutcome::Executed(results) = run.outcome else {
            panic!("expected an executed run");
        };
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.outcome.is_success()));
    }

    #[tokio::test]
    async fn test_duplicate_remote_paths_abort_pass() {
        let catalog = FakeCatalog::new(
            vec![ps2_console()],
            vec![
                record(10, 1, "save1.bin", 0),
                record(11, 1, "save1.bin", 5),
            ],
        );
        let runner = runner(catalog, FakeStore::default());

        let err = runner
            .run_console(&entry("ps2"), &RunOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ambiguous join key"));
    }

    #[tokio::test]
    async fn test_run_all_isolates_console_failures() {
        // "ps2" exists; "n64" does not and crawl=update refuses to create.
        let catalog = FakeCatalog::new(vec![ps2_console()], vec![]);
        let runner = runner(catalog, FakeStore::default());

        let opts = RunOptions {
            crawl: CrawlMode::Update,
            action: ActionMode::Update,
            ..RunOptions::default()
        };

        let runs = runner
            .run_all(
                &[entry("ps2"), entry("n64")],
                &opts,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "ps2");
        assert!(runs[0].1.is_ok());
        assert_eq!(runs[1].0, "n64");
        assert!(runs[1].1.is_err());
    }
}
