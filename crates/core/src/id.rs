//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a book title (its ISBN).
///
/// Copies of a title are counted, not individually identified, so the ISBN
/// is the only key a book needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

/// Identifier of a library user (their username).
///
/// Usernames are case-insensitive; the identifier is stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a borrowing transaction.
///
/// Assigned monotonically by the ledger, starting at 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal, $normalize:expr) => {
        impl $t {
            /// Parse and normalize an identifier. Blank input is rejected.
            pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                let normalize: fn(&str) -> String = $normalize;
                Ok(Self(normalize(trimmed)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(Isbn, "isbn", |s| s.to_string());
impl_string_newtype!(UserId, "user id", |s| s.to_lowercase());

impl TransactionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The following id, or `None` once the range is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = DomainError;

    /// Accepts both `42` and the display form `T42`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix(['T', 't']).unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|e| DomainError::validation(format!("transaction id '{s}': {e}")))
    }
}
