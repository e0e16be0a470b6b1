//! Registered library users.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, Entity, UserId};

use crate::{AccessLevel, CredentialDigest};

/// A registered user.
///
/// # Invariants
/// - `id` is unique in the directory (case-insensitive).
/// - `credential` is opaque; only the credential service interprets it.
/// - The ledger never mutates users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_level: AccessLevel,
    pub credential: CredentialDigest,
    pub registered_on: NaiveDate,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration request.
///
/// `credential` is the raw secret; it is passed to the credential service and
/// dropped.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub access_level: AccessLevel,
    pub credential: String,
    pub registered_on: NaiveDate,
}

impl NewUser {
    /// Validate and normalize the user-facing fields.
    pub(crate) fn validated(mut self) -> DomainResult<Self> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        self.display_name = display_name.to_string();

        self.email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if email.contains('@') => Some(email.to_lowercase()),
            Some(_) => return Err(DomainError::validation("invalid email format")),
        };

        if self.credential.is_empty() {
            return Err(DomainError::validation("credential cannot be empty"));
        }
        Ok(self)
    }
}
