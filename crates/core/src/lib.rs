//! `libris-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog,
//! directory and ledger (no IO, no storage, no logging).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{Entity, index_by_id};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{Isbn, TransactionId, UserId};
pub use value_object::Money;
