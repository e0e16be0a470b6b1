use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use libris_core::{Entity, Isbn, Money, TransactionId, UserId};

/// Lifecycle state of a loan. `Open` -> `Closed`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Open,
    Closed,
}

impl core::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransactionState::Open => f.write_str("open"),
            TransactionState::Closed => f.write_str("closed"),
        }
    }
}

/// One loan of one copy.
///
/// Created open at issue; closed exactly once at return, when `returned_at`
/// and `fine` are set together. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub(crate) id: TransactionId,
    pub(crate) isbn: Isbn,
    pub(crate) user_id: UserId,
    pub(crate) issued_at: DateTime<Utc>,
    pub(crate) due_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) returned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) fine: Option<Money>,
}

impl Transaction {
    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    /// Fine charged at return; `None` while the loan is open.
    pub fn fine(&self) -> Option<Money> {
        self.fine
    }

    pub fn state(&self) -> TransactionState {
        if self.returned_at.is_some() {
            TransactionState::Closed
        } else {
            TransactionState::Open
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == TransactionState::Open
    }

    /// Open and past due at `as_of`.
    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        self.is_open() && self.due_at < as_of
    }

    pub(crate) fn close(&mut self, returned_at: DateTime<Utc>, fine: Money) {
        self.returned_at = Some(returned_at);
        self.fine = Some(fine);
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
