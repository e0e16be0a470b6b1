use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use libris_catalog::Catalog;
use libris_core::{DomainError, DomainResult, Isbn, Money, TransactionId, UserId};
use libris_directory::{CredentialService, Directory};

use crate::policy::LoanPolicy;
use crate::transaction::Transaction;

/// Append-only record of loans.
///
/// Every operation validates first and mutates last, so a failed call leaves
/// both the ledger and the catalog exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    policy: LoanPolicy,
    transactions: Vec<Transaction>,
    positions: HashMap<TransactionId, usize>,
    next_id: TransactionId,
}

impl Ledger {
    pub fn new(policy: LoanPolicy) -> Self {
        Self {
            policy,
            transactions: Vec::new(),
            positions: HashMap::new(),
            next_id: TransactionId::new(1),
        }
    }

    /// Rebuild a ledger from persisted records (kept in the given order).
    ///
    /// New ids continue after the highest persisted one.
    pub fn from_transactions(
        policy: LoanPolicy,
        transactions: impl IntoIterator<Item = Transaction>,
    ) -> DomainResult<Self> {
        let mut ledger = Self::new(policy);
        for txn in transactions {
            if txn.due_at < txn.issued_at {
                return Err(DomainError::validation(format!(
                    "transaction {} is due before it was issued",
                    txn.id
                )));
            }
            if txn.returned_at.is_some() != txn.fine.is_some() {
                return Err(DomainError::validation(format!(
                    "transaction {} has a return date without a fine (or vice versa)",
                    txn.id
                )));
            }
            if ledger.positions.contains_key(&txn.id) {
                return Err(DomainError::validation(format!("duplicate transaction id {}", txn.id)));
            }
            if txn.id >= ledger.next_id {
                ledger.next_id = txn.id.next().ok_or_else(|| {
                    DomainError::validation(format!("transaction id {} is out of range", txn.id))
                })?;
            }
            ledger.positions.insert(txn.id, ledger.transactions.len());
            ledger.transactions.push(txn);
        }
        Ok(ledger)
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Lend one copy of `isbn` to `user_id`.
    pub fn issue_book<C: CredentialService>(
        &mut self,
        catalog: &mut Catalog,
        directory: &Directory<C>,
        user_id: &UserId,
        isbn: &Isbn,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        if !directory.contains(user_id) {
            return Err(DomainError::not_found(format!("user {user_id}")));
        }
        let book = catalog
            .get(isbn)
            .ok_or_else(|| DomainError::not_found(format!("book {isbn}")))?;
        if !book.is_available() {
            return Err(DomainError::conflict("no copies available"));
        }
        if self
            .transactions
            .iter()
            .any(|t| t.is_open() && &t.user_id == user_id && &t.isbn == isbn)
        {
            return Err(DomainError::conflict(format!(
                "user {user_id} already has {isbn} on loan"
            )));
        }
        let due_at = self.policy.due_date(issued_at)?;
        let following = self
            .next_id
            .next()
            .ok_or_else(|| DomainError::conflict("transaction ids exhausted"))?;

        catalog.decrement_available(isbn)?;

        let txn = Transaction {
            id: self.next_id,
            isbn: isbn.clone(),
            user_id: user_id.clone(),
            issued_at,
            due_at,
            returned_at: None,
            fine: None,
        };
        self.next_id = following;
        self.positions.insert(txn.id, self.transactions.len());
        self.transactions.push(txn.clone());

        tracing::debug!(transaction = %txn.id, %isbn, user = %user_id, due = %due_at, "loan opened");
        Ok(txn)
    }

    /// Close an open loan, charging a fine for every started overdue day.
    pub fn return_book(
        &mut self,
        catalog: &mut Catalog,
        transaction_id: TransactionId,
        returned_at: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        let position = *self
            .positions
            .get(&transaction_id)
            .ok_or_else(|| DomainError::not_found(format!("transaction {transaction_id}")))?;
        let txn = &self.transactions[position];
        if !txn.is_open() {
            return Err(DomainError::conflict(format!(
                "transaction {transaction_id} is already closed"
            )));
        }
        if returned_at < txn.issued_at {
            return Err(DomainError::validation(format!(
                "return at {returned_at} precedes issue at {}",
                txn.issued_at
            )));
        }
        let fine = self.policy.fine_for(txn.due_at, returned_at);

        catalog.increment_available(&txn.isbn)?;

        let txn = &mut self.transactions[position];
        txn.close(returned_at, fine);

        tracing::debug!(transaction = %transaction_id, isbn = %txn.isbn, %fine, "loan closed");
        Ok(txn.clone())
    }

    /// Open loans due strictly before `as_of`, earliest due first (ties keep
    /// issue order). Calling again restarts the sequence.
    pub fn overdue_transactions(&self, as_of: DateTime<Utc>) -> impl Iterator<Item = &Transaction> + '_ {
        let mut overdue: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.is_overdue(as_of))
            .collect();
        overdue.sort_by_key(|t| t.due_at);
        overdue.into_iter()
    }

    /// Every loan (open and closed) by `user_id`, in insertion order.
    pub fn history_for_user<'a>(&'a self, user_id: &'a UserId) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| &t.user_id == user_id)
    }

    /// Every loan (open and closed) of `isbn`, in insertion order.
    pub fn history_for_book<'a>(&'a self, isbn: &'a Isbn) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| &t.isbn == isbn)
    }

    pub fn open_loans_for_user<'a>(&'a self, user_id: &'a UserId) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.history_for_user(user_id).filter(|t| t.is_open())
    }

    /// What an open loan would be charged if returned at `as_of`.
    /// Closed loans report the fine actually charged.
    pub fn accrued_fine(&self, txn: &Transaction, as_of: DateTime<Utc>) -> Money {
        txn.fine
            .unwrap_or_else(|| self.policy.fine_for(txn.due_at, as_of))
    }

    pub fn open_loan_count(&self, isbn: &Isbn) -> usize {
        self.history_for_book(isbn).filter(|t| t.is_open()).count()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.positions.get(&id).map(|&pos| &self.transactions[pos])
    }

    /// All transactions in insertion order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Check `available == total - open loans` for every book, and that every
    /// open loan points at a catalogued book.
    pub fn verify_availability(&self, catalog: &Catalog) -> DomainResult<()> {
        let mut open: BTreeMap<&Isbn, u32> = BTreeMap::new();
        for txn in self.transactions.iter().filter(|t| t.is_open()) {
            if !catalog.contains(&txn.isbn) {
                return Err(DomainError::conflict(format!(
                    "open transaction {} references unknown book {}",
                    txn.id, txn.isbn
                )));
            }
            *open.entry(&txn.isbn).or_default() += 1;
        }

        for book in catalog.books() {
            let loans = open.get(&book.isbn).copied().unwrap_or(0);
            if book.on_loan() != loans {
                return Err(DomainError::conflict(format!(
                    "book {} shows {} of {} copies on loan but has {} open transactions",
                    book.isbn,
                    book.on_loan(),
                    book.total_copies(),
                    loans
                )));
            }
        }
        Ok(())
    }
}
