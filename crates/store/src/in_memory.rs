use std::sync::RwLock;

use crate::r#trait::{Store, StoreError};
use crate::Snapshot;

/// In-memory store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: RwLock<Snapshot>,
    saves: RwLock<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            saves: RwLock::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.read().map(|n| *n).unwrap_or(0)
    }
}

impl Store for InMemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(snapshot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut current = self
            .snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *current = snapshot.clone();
        if let Ok(mut saves) = self.saves.write() {
            *saves += 1;
        }
        Ok(())
    }
}
