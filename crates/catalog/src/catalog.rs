use std::collections::BTreeMap;

use libris_core::{DomainError, DomainResult, Isbn, index_by_id};

use crate::book::{Book, NewBook};

/// In-memory book catalog keyed by ISBN.
///
/// Counters are only ever changed through these methods, so every failed call
/// leaves the catalog untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: BTreeMap<Isbn, Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from persisted records.
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> DomainResult<Self> {
        let books = index_by_id(books, "isbn")?;
        for book in books.values() {
            book.check_counters()?;
        }
        Ok(Self { books })
    }

    /// Add a new title, or more copies of an existing one.
    ///
    /// For an existing ISBN the stored metadata is kept and only the counters
    /// grow.
    pub fn add_book(&mut self, new_book: NewBook) -> DomainResult<&Book> {
        if new_book.copies == 0 {
            return Err(DomainError::validation("copies must be positive"));
        }

        let isbn = new_book.isbn.clone();
        if let Some(existing) = self.books.get_mut(&isbn) {
            existing.add_copies(new_book.copies)?;
        } else {
            let book = new_book.into_book()?;
            self.books.insert(isbn.clone(), book);
        }
        self.book(&isbn)
    }

    /// Withdraw `copies` copies of a title.
    ///
    /// Only shelved copies can be withdrawn, so the result never drops below
    /// the number of open loans. When the last copy goes, the title goes.
    /// Returns the remaining record, or `None` if the title was removed.
    pub fn remove_book(&mut self, isbn: &Isbn, copies: u32) -> DomainResult<Option<&Book>> {
        if copies == 0 {
            return Err(DomainError::validation("copies must be positive"));
        }
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| DomainError::not_found(format!("book {isbn}")))?;
        book.remove_copies(copies)?;

        if book.total_copies() == 0 {
            self.books.remove(isbn);
            return Ok(None);
        }
        Ok(self.books.get(isbn))
    }

    /// Lazily filter the catalog. Calling again restarts from the beginning.
    pub fn search<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Book> + 'a
    where
        P: Fn(&Book) -> bool + 'a,
    {
        self.books.values().filter(move |book| predicate(book))
    }

    /// Take one copy off the shelf. Called by the ledger when issuing.
    pub fn decrement_available(&mut self, isbn: &Isbn) -> DomainResult<()> {
        self.book_mut(isbn)?.checkout()
    }

    /// Put one copy back on the shelf. Called by the ledger on return.
    pub fn increment_available(&mut self, isbn: &Isbn) -> DomainResult<()> {
        self.book_mut(isbn)?.checkin()
    }

    pub fn get(&self, isbn: &Isbn) -> Option<&Book> {
        self.books.get(isbn)
    }

    pub fn contains(&self, isbn: &Isbn) -> bool {
        self.books.contains_key(isbn)
    }

    /// All books in ISBN order.
    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn book(&self, isbn: &Isbn) -> DomainResult<&Book> {
        self.books
            .get(isbn)
            .ok_or_else(|| DomainError::not_found(format!("book {isbn}")))
    }

    fn book_mut(&mut self, isbn: &Isbn) -> DomainResult<&mut Book> {
        self.books
            .get_mut(isbn)
            .ok_or_else(|| DomainError::not_found(format!("book {isbn}")))
    }
}
