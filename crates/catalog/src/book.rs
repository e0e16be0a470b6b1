use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, Entity, Isbn};

/// A catalogued title and its copy counters.
///
/// # Invariants
/// - `0 <= available_copies <= total_copies`
/// - `available_copies == total_copies - open loans for this isbn`
///   (maintained jointly with the ledger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    total_copies: u32,
    available_copies: u32,
}

impl Book {
    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently out on loan.
    pub fn on_loan(&self) -> u32 {
        self.total_copies - self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub(crate) fn add_copies(&mut self, copies: u32) -> DomainResult<()> {
        let total = self.total_copies.checked_add(copies);
        let available = self.available_copies.checked_add(copies);
        match (total, available) {
            (Some(total), Some(available)) => {
                self.total_copies = total;
                self.available_copies = available;
                Ok(())
            }
            _ => Err(DomainError::validation("copy count overflow")),
        }
    }

    pub(crate) fn remove_copies(&mut self, copies: u32) -> DomainResult<()> {
        if copies > self.available_copies {
            return Err(DomainError::conflict(format!(
                "cannot remove {copies} copies of {}: only {} available ({} on loan)",
                self.isbn,
                self.available_copies,
                self.on_loan()
            )));
        }
        self.total_copies -= copies;
        self.available_copies -= copies;
        Ok(())
    }

    pub(crate) fn checkout(&mut self) -> DomainResult<()> {
        if self.available_copies == 0 {
            return Err(DomainError::conflict(format!(
                "no copies available of {}",
                self.isbn
            )));
        }
        self.available_copies -= 1;
        Ok(())
    }

    pub(crate) fn checkin(&mut self) -> DomainResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(DomainError::conflict(format!(
                "all {} copies of {} are already on the shelf",
                self.total_copies, self.isbn
            )));
        }
        self.available_copies += 1;
        Ok(())
    }

    pub(crate) fn check_counters(&self) -> DomainResult<()> {
        if self.available_copies > self.total_copies {
            return Err(DomainError::validation(format!(
                "book {} has {} available of {} total copies",
                self.isbn, self.available_copies, self.total_copies
            )));
        }
        Ok(())
    }
}

impl Entity for Book {
    type Id = Isbn;

    fn id(&self) -> &Self::Id {
        &self.isbn
    }
}

/// Input for [`crate::Catalog::add_book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub copies: u32,
}

impl NewBook {
    pub(crate) fn into_book(self) -> DomainResult<Book> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.author.trim().is_empty() {
            return Err(DomainError::validation("author cannot be empty"));
        }
        Ok(Book {
            isbn: self.isbn,
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            category: self.category.trim().to_string(),
            publisher: self.publisher.filter(|p| !p.trim().is_empty()),
            year: self.year,
            total_copies: self.copies,
            available_copies: self.copies,
        })
    }
}
