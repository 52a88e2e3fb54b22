//! Atomic snapshot store.
//!
//! One live snapshot at a time behind `RwLock<Arc<Snapshot>>`: readers clone
//! the `Arc` and drop the lock immediately, so a scrape holds no lock while
//! it renders and the writer blocks only for the swap itself. A reader
//! always sees a whole snapshot from a single refresh cycle, never a mix.

use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{Project, Snapshot};

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Creates a store holding the empty generation-0 placeholder.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Returns the current snapshot. Blocks only for the duration of the
    /// pointer clone.
    pub fn read(&self) -> Arc<Snapshot> {
        self.current.read().unwrap().clone()
    }

    /// Installs a new snapshot assembled from `projects`, superseding the
    /// previous one. Returns the new generation.
    pub fn replace(&self, projects: Vec<Project>) -> u64 {
        let mut slot = self.current.write().unwrap();
        let generation = slot.generation + 1;
        *slot = Arc::new(Snapshot {
            generation,
            taken_at: now_epoch(),
            projects,
        });
        generation
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
