//! Credential verification boundary.
//!
//! The directory never compares raw secrets itself; it hands them to a
//! [`CredentialService`] and stores whatever opaque digest comes back.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use libris_core::UserId;

/// Opaque stored credential material.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialDigest(..)")
    }
}

/// External credential check.
pub trait CredentialService {
    /// Produce the digest to store for a freshly set credential.
    fn digest(&self, id: &UserId, credential: &str) -> CredentialDigest;

    /// Check a presented credential against the stored digest.
    fn verify(&self, id: &UserId, credential: &str, stored: &CredentialDigest) -> bool;
}

/// SHA-256 digests salted with the user id, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Credentials;

impl CredentialService for Sha256Credentials {
    fn digest(&self, id: &UserId, credential: &str) -> CredentialDigest {
        let mut hasher = Sha256::new();
        hasher.update(id.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(credential.as_bytes());
        CredentialDigest(format!("{:x}", hasher.finalize()))
    }

    fn verify(&self, id: &UserId, credential: &str, stored: &CredentialDigest) -> bool {
        self.digest(id, credential) == *stored
    }
}
