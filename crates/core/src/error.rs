//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts, access). Infrastructure concerns (files, config)
/// have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input (e.g. a non-positive copy count).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An unknown book, user or transaction was referenced.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation would break an invariant (no copies left, double return,
    /// availability underflow/overflow, duplicate registration).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor's access level does not permit the operation.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Credentials were rejected.
    #[error("authentication failed")]
    Auth,
}

/// Coarse classification of a [`DomainError`].
///
/// Callers (the CLI, tests) map this to messages and exit codes without
/// matching on payloads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Permission,
    Auth,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Permission(_) => ErrorKind::Permission,
            DomainError::Auth => ErrorKind::Auth,
        }
    }
}
