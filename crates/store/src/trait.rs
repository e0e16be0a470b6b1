use std::path::PathBuf;

use thiserror::Error;

use crate::Snapshot;

/// Persistence errors.
///
/// These are **infrastructure errors** (files, encoding) as opposed to domain
/// errors (validation, invariants). A snapshot that decodes fine but breaks a
/// domain invariant is rejected later, when the library is restored from it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Load/save boundary for library state.
///
/// Implementations must round-trip: `load()` after `save(x)` returns a
/// snapshot equal to `x`, field for field. Loading a store that was never
/// saved returns an empty snapshot. A save that fails partway must leave the
/// store loading either the previous snapshot or the new one, never a mix.
pub trait Store {
    fn load(&self) -> Result<Snapshot, StoreError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}
