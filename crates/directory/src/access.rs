use core::str::FromStr;

use serde::{Deserialize, Serialize};

use libris_core::DomainError;

/// Access level of a library user.
///
/// A closed set: every permission check matches all three variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Borrows and returns their own books.
    #[default]
    Member,
    /// Manages the catalog and circulation for everyone.
    Librarian,
    /// Everything a librarian can do, plus user administration.
    Admin,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Member => "member",
            AccessLevel::Librarian => "librarian",
            AccessLevel::Admin => "admin",
        }
    }
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(AccessLevel::Member),
            "librarian" => Ok(AccessLevel::Librarian),
            "admin" => Ok(AccessLevel::Admin),
            other => Err(DomainError::validation(format!(
                "access level must be one of: member, librarian, admin (got '{other}')"
            ))),
        }
    }
}
