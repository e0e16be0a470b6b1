//! Catalog domain module.
//!
//! Book records and per-title copy counts, implemented as deterministic
//! domain logic (no IO, no storage). Availability is a counter reconciled by
//! the ledger, not a collection of copy handles.

pub mod book;
pub mod catalog;
pub mod query;

pub use book::{Book, NewBook};
pub use catalog::Catalog;
pub use query::{BookQuery, SearchField};
