//! Per-working-tree serialization of invocations within one process.
//!
//! Separate processes are not coordinated here; git's own `index.lock`
//! is the only guard between them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per working-tree root.
#[derive(Debug, Default)]
pub struct WorkdirLocks {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl WorkdirLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static WorkdirLocks {
        static GLOBAL: OnceLock<WorkdirLocks> = OnceLock::new();
        GLOBAL.get_or_init(WorkdirLocks::new)
    }

    /// Wait until no other invocation holds `root`, then hold it until the
    /// guard is dropped.
    pub async fn acquire(&self, root: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(root.to_path_buf())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
