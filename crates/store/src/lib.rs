//! Persistence gateway.
//!
//! Loads and saves the catalog, directory and ledger records at process
//! boundaries. The domain never calls into this crate while an operation is
//! running; a crash between a mutation and the next save loses that mutation.

pub mod in_memory;
pub mod json_file;
pub mod snapshot;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
pub use snapshot::Snapshot;
pub use r#trait::{Store, StoreError};
