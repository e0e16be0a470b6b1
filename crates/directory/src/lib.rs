//! `libris-directory`: registered users, access levels and credential checks.
//!
//! This crate is intentionally decoupled from storage and transport. Credential
//! verification is delegated to a [`CredentialService`]; the directory only
//! ever stores the opaque digest it returns.

pub mod access;
pub mod authorize;
pub mod credentials;
pub mod directory;
pub mod permissions;
pub mod user;

pub use access::AccessLevel;
pub use authorize::authorize;
pub use credentials::{CredentialDigest, CredentialService, Sha256Credentials};
pub use directory::Directory;
pub use permissions::Permission;
pub use user::{NewUser, User};
