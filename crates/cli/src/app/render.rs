//! Plain-text rendering of command results.

use chrono::{DateTime, Utc};

use libris_catalog::Book;
use libris_directory::User;
use libris_ledger::Transaction;

use super::library::LoanView;

fn instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

pub fn book_line(book: &Book) -> String {
    let mut line = format!(
        "{}  {} by {} [{}]  {}/{} available",
        book.isbn,
        book.title,
        book.author,
        book.category,
        book.available_copies(),
        book.total_copies()
    );
    if let Some(year) = book.year {
        line.push_str(&format!("  ({year})"));
    }
    line
}

pub fn user_line(user: &User) -> String {
    match &user.email {
        Some(email) => format!("{}  {} <{}>  {}", user.id, user.display_name, email, user.access_level),
        None => format!("{}  {}  {}", user.id, user.display_name, user.access_level),
    }
}

pub fn transaction_line(txn: &Transaction) -> String {
    let mut line = format!(
        "{}  {}  {}  issued {}  due {}",
        txn.id_typed(),
        txn.isbn(),
        txn.user_id(),
        instant(txn.issued_at()),
        instant(txn.due_at())
    );
    match (txn.returned_at(), txn.fine()) {
        (Some(returned), Some(fine)) => {
            line.push_str(&format!("  returned {}  fine {fine}", instant(returned)));
        }
        _ => line.push_str("  open"),
    }
    line
}

pub fn loan_line(loan: &LoanView) -> String {
    let txn = &loan.transaction;
    let mut line = format!(
        "{}  {} \"{}\"  {}  due {}",
        txn.id_typed(),
        txn.isbn(),
        loan.title,
        loan.borrower,
        instant(txn.due_at())
    );
    if loan.days_overdue > 0 {
        line.push_str(&format!(
            "  {} day(s) overdue  fine {}",
            loan.days_overdue, loan.accrued_fine
        ));
    }
    line
}
