//! Ledger domain module: the borrowing transaction lifecycle.
//!
//! Issuing and returning books, due dates, late fines, and the
//! availability bookkeeping that keeps the catalog consistent with open loans.

pub mod ledger;
pub mod policy;
pub mod transaction;

pub use ledger::Ledger;
pub use policy::LoanPolicy;
pub use transaction::{Transaction, TransactionState};
