use serde::{Deserialize, Serialize};

use libris_catalog::Book;
use libris_directory::User;
use libris_ledger::Transaction;

/// Everything the library persists, as plain records.
///
/// Order is preserved: transactions in particular are history and are
/// restored in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.users.is_empty() && self.transactions.is_empty()
    }
}
