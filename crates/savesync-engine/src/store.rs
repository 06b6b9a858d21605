//! Local save store adapter (secondary/driven adapter)
//!
//! Implements [`SaveStore`] using `tokio::fs`.
//!
//! ## Design Decisions
//!
//! - **Atomic writes**: write-to-temp + rename in the same directory, so a
//!   crash mid-write never leaves a half-written savefile in place of a
//!   good one.
//! - **Timestamps**: downloaded files get their modification time stamped
//!   with the catalog's `updated_at`, keeping later timestamp comparisons
//!   meaningful across machines.
//! - **Optional hashing**: the scanner can compute a SHA-256 digest per
//!   file; it costs a full read, so it is off unless configured.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use savesync_core::domain::newtypes::SavePath;
use savesync_core::domain::savefile::LocalFileDescriptor;
use savesync_core::ports::save_store::{SaveStore, StoreError};

/// Adapter that bridges the [`SaveStore`] port to the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalSaveStore {
    /// Whether `scan` computes content hashes
    hash_contents: bool,
}

impl LocalSaveStore {
    /// Create a store that scans metadata only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that also hashes file contents during scans.
    #[must_use]
    pub fn with_content_hashing() -> Self {
        Self {
            hash_contents: true,
        }
    }
}

/// Converts a normalized save path into a filesystem path below `root`.
fn fs_path(root: &Path, path: &SavePath) -> PathBuf {
    let mut full = root.to_path_buf();
    for component in path.as_str().split('/') {
        full.push(component);
    }
    full
}

/// Builds the relative save path for a file found during a scan.
fn relative_save_path(root: &Path, file: &Path) -> Option<SavePath> {
    let relative = file.strip_prefix(root).ok()?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    SavePath::new(joined).ok()
}

#[async_trait::async_trait]
impl SaveStore for LocalSaveStore {
    #[instrument(skip(self), fields(root = %root.display()))]
    async fn scan(&self, root: &Path) -> Result<Vec<LocalFileDescriptor>, StoreError> {
        // Fail up front if the root itself is unreadable.
        tokio::fs::read_dir(root)
            .await
            .map_err(|source| StoreError::Root {
                root: root.display().to_string(),
                source,
            })?;

        let mut descriptors = Vec::new();
        walk(self.hash_contents, root, root.to_path_buf(), &mut descriptors).await?;

        descriptors.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(files = descriptors.len(), "scan complete");
        Ok(descriptors)
    }

    #[instrument(skip(self), fields(root = %root.display(), path = %path))]
    async fn read(&self, root: &Path, path: &SavePath) -> Result<Vec<u8>, StoreError> {
        let full = fs_path(root, path);
        tokio::fs::read(&full)
            .await
            .map_err(|source| StoreError::Read {
                path: path.as_str().to_string(),
                source,
            })
    }

    #[instrument(skip(self, bytes), fields(root = %root.display(), path = %path, bytes = bytes.len()))]
    async fn write_atomic(
        &self,
        root: &Path,
        path: &SavePath,
        bytes: &[u8],
        mtime: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let target = fs_path(root, path);
        let write_err = |source: io::Error| StoreError::Write {
            path: path.as_str().to_string(),
            source,
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Temp file in the same directory so the rename stays on one
        // filesystem and is atomic.
        let tmp_path = {
            let mut p = target.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };

        debug!(?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &target).await.map_err(write_err)?;

        // Stamp the catalog's timestamp onto the file. A failed stamp only
        // degrades later timestamp comparisons; the content is in place.
        let stamp: SystemTime = mtime.into();
        let stamp_target = target.clone();
        let stamped = tokio::task::spawn_blocking(move || {
            std::fs::File::options()
                .write(true)
                .open(&stamp_target)
                .and_then(|file| file.set_modified(stamp))
        })
        .await;

        match stamped {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(path = %path, error = %err, "failed to stamp modification time");
            }
            Err(join_err) => {
                warn!(path = %path, error = %join_err, "mtime stamping task failed");
            }
        }

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    async fn ensure_root(&self, root: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| StoreError::Root {
                root: root.display().to_string(),
                source,
            })
    }
}

/// Recursively walks a directory, producing a descriptor per file.
fn walk<'a>(
    hash_contents: bool,
    root: &'a Path,
    dir: PathBuf,
    out: &'a mut Vec<LocalFileDescriptor>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StoreError>> + Send + 'a>> {
    Box::pin(async move {
        let read_err = |source: io::Error| StoreError::Read {
            path: dir.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_err)?;

        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let entry_path = entry.path();
            let metadata = entry.metadata().await.map_err(|source| StoreError::Read {
                path: entry_path.display().to_string(),
                source,
            })?;

            if metadata.is_dir() {
                walk(hash_contents, root, entry_path, out).await?;
                continue;
            }
            if !metadata.is_file() {
                // Sockets, fifos, dangling symlinks: nothing to sync.
                continue;
            }

            let Some(relative_path) = relative_save_path(root, &entry_path) else {
                warn!(path = %entry_path.display(), "skipping file with unrepresentable path");
                continue;
            };

            let modified_at: DateTime<Utc> = metadata
                .modified()
                .map_err(|source| StoreError::Read {
                    path: relative_path.as_str().to_string(),
                    source,
                })?
                .into();

            let content_hash = if hash_contents {
                let data = tokio::fs::read(&entry_path).await.map_err(|source| {
                    StoreError::Read {
                        path: relative_path.as_str().to_string(),
                        source,
                    }
                })?;
                Some(format!("{:x}", Sha256::digest(&data)))
            } else {
                None
            };

            out.push(LocalFileDescriptor {
                relative_path,
                size_bytes: metadata.len(),
                modified_at,
                content_hash,
            });
        }

        Ok(())
    })
}
