//! Starter titles for an empty catalog, stocked when `seed_catalog` is on.

use libris_catalog::NewBook;
use libris_core::{DomainResult, Isbn};

/// (isbn, title, author, category, publisher, year, copies)
type StarterTitle = (&'static str, &'static str, &'static str, &'static str, &'static str, i32, u32);

const STARTER_TITLES: &[StarterTitle] = &[
    ("978-1234567890", "Python Programming for Beginners", "John Smith", "Programming", "Tech Publications", 2022, 3),
    ("978-0136520238", "Introduction to Java Programming", "Daniel Liang", "Programming", "Pearson", 2021, 2),
    ("978-0131103627", "C Programming Language", "Brian Kernighan, Dennis Ritchie", "Programming", "Prentice Hall", 1988, 5),
    ("978-0072465631", "Database Management Systems", "Raghu Ramakrishnan", "Databases", "McGraw-Hill", 2002, 2),
    ("978-0071592550", "SQL: The Complete Reference", "James Groff", "Databases", "McGraw-Hill", 2010, 3),
    ("978-1118290279", "Data Structures and Algorithms in Python", "Michael T. Goodrich", "Algorithms", "Wiley", 2013, 2),
    ("978-0262033848", "Introduction to Algorithms", "Thomas H. Cormen", "Algorithms", "MIT Press", 2009, 3),
    ("978-0132126953", "Computer Networks", "Andrew S. Tanenbaum", "Networking", "Pearson", 2010, 2),
    ("978-0137053469", "Software Engineering", "Ian Sommerville", "Software Engineering", "Pearson", 2015, 2),
    ("978-1491949306", "Web Development with Node and Express", "Ethan Brown", "Web Development", "O'Reilly Media", 2019, 2),
    ("978-1118008188", "HTML and CSS: Design and Build Websites", "Jon Duckett", "Web Development", "Wiley", 2011, 3),
    ("978-1118063330", "Operating System Concepts", "Abraham Silberschatz", "Operating Systems", "Wiley", 2012, 2),
    ("978-0073383095", "Discrete Mathematics and Its Applications", "Kenneth Rosen", "Mathematics", "McGraw-Hill", 2018, 2),
    ("978-1285741550", "Calculus: Early Transcendentals", "James Stewart", "Mathematics", "Cengage Learning", 2015, 2),
    ("978-0136042594", "Artificial Intelligence: A Modern Approach", "Stuart Russell, Peter Norvig", "Artificial Intelligence", "Pearson", 2020, 2),
];

pub fn starter_books() -> DomainResult<Vec<NewBook>> {
    STARTER_TITLES
        .iter()
        .map(|&(isbn, title, author, category, publisher, year, copies)| {
            Ok(NewBook {
                isbn: Isbn::parse(isbn)?,
                title: title.to_string(),
                author: author.to_string(),
                category: category.to_string(),
                publisher: Some(publisher.to_string()),
                year: Some(year),
                copies,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn starter_titles_are_distinct_and_stocked() {
        let books = starter_books().unwrap();
        assert_eq!(books.len(), STARTER_TITLES.len());

        let isbns: BTreeSet<_> = books.iter().map(|b| b.isbn.clone()).collect();
        assert_eq!(isbns.len(), books.len());
        assert!(books.iter().all(|b| b.copies > 0));
    }
}
