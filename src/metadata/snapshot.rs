// src/metadata/snapshot.rs

//! Exclusive access to a store snapshot file.
//!
//! Sibling tasks are driven by separate processes that share one snapshot.
//! Each invocation holds a [`SnapshotLock`] from load through save, so ids
//! are handed out from the latest state and no save overwrites records it
//! never saw.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tracing::debug;

use crate::context::InvocationContext;

use super::{MemoryMetadataStore, StoreError};

/// Held exclusive lock on `<snapshot>.lock`.
///
/// The lock lives on a sidecar file because saving replaces the snapshot
/// itself. Dropping the guard releases the lock.
#[derive(Debug)]
pub struct SnapshotLock {
    path: PathBuf,
    _lock_file: File,
}

impl SnapshotLock {
    /// Wait for the lock on `path`, giving up on cancellation or deadline.
    pub async fn acquire(
        ctx: &InvocationContext,
        path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let lock_path = lock_path_for(&path);
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let waiting = lock_path.clone();
        let lock_file = ctx
            .run("lock metadata state", async move {
                tokio::task::spawn_blocking(move || -> Result<File, StoreError> {
                    let file = OpenOptions::new()
                        .create(true)
                        .truncate(false)
                        .write(true)
                        .open(&waiting)?;
                    file.lock_exclusive()?;
                    Ok(file)
                })
                .await
                .map_err(|e| StoreError::Unavailable(format!("lock task failed: {e}")))?
            })
            .await?;
        debug!(?lock_path, "acquired metadata state lock");

        Ok(Self {
            path,
            _lock_file: lock_file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, or an empty store if none was saved yet.
    pub fn load(&self) -> Result<MemoryMetadataStore, StoreError> {
        MemoryMetadataStore::load_or_default(&self.path)
    }

    pub fn save(&self, store: &MemoryMetadataStore) -> Result<(), StoreError> {
        store.save(&self.path)
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}
