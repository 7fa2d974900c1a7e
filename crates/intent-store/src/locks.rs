//! Per-workspace writer serialization.
//!
//! The ledger and the intent map are shared by every session governing the
//! same workspace. Writers take the lock for their sidecar directory before
//! touching either file, so appends never interleave and map rewrites never
//! lose updates within this process. Entries are dropped once no writer
//! holds or waits on them.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

static WORKSPACE_LOCKS: LazyLock<DashMap<PathBuf, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

/// Lock handle for one sidecar directory.
pub fn workspace_lock(sidecar_dir: &Path) -> Arc<Mutex<()>> {
    WORKSPACE_LOCKS
        .entry(sidecar_dir.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Held writer lock. Dropping the last handle for a directory removes its
/// registry entry.
pub struct WorkspaceGuard {
    sidecar_dir: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry's own handle left: no holder and no waiter.
        let _ = WORKSPACE_LOCKS
            .remove_if(&self.sidecar_dir, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Acquire the writer lock for a sidecar directory.
pub async fn lock_workspace(sidecar_dir: &Path) -> WorkspaceGuard {
    let guard = workspace_lock(sidecar_dir).lock_owned().await;
    WorkspaceGuard {
        sidecar_dir: sidecar_dir.to_path_buf(),
        guard: Some(guard),
    }
}
