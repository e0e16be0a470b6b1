//! Catalog search predicates.

use serde::{Deserialize, Serialize};

use crate::book::Book;

/// Book field a query can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Author,
    Isbn,
    Category,
}

/// Case-insensitive substring query over book metadata.
///
/// With no field set, a book matches when any of title, author, isbn or
/// category contains the term. An empty term matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    term: String,
    field: Option<SearchField>,
}

impl BookQuery {
    pub fn any(term: impl AsRef<str>) -> Self {
        Self {
            term: term.as_ref().trim().to_lowercase(),
            field: None,
        }
    }

    pub fn field(field: SearchField, term: impl AsRef<str>) -> Self {
        Self {
            field: Some(field),
            ..Self::any(term)
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        let hit = |value: &str| value.to_lowercase().contains(&self.term);
        match self.field {
            Some(SearchField::Title) => hit(&book.title),
            Some(SearchField::Author) => hit(&book.author),
            Some(SearchField::Isbn) => hit(book.isbn.as_str()),
            Some(SearchField::Category) => hit(&book.category),
            None => {
                hit(&book.title)
                    || hit(&book.author)
                    || hit(book.isbn.as_str())
                    || hit(&book.category)
            }
        }
    }
}
