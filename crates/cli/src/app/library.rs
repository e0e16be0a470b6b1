use chrono::{DateTime, NaiveDate, Utc};

use libris_catalog::{Book, BookQuery, Catalog, NewBook};
use libris_core::{DomainError, DomainResult, Isbn, Money, TransactionId, UserId};
use libris_directory::{
    AccessLevel, CredentialService, Directory, NewUser, Permission, Sha256Credentials, User,
};
use libris_ledger::{Ledger, LoanPolicy, Transaction};
use libris_store::Snapshot;

use crate::authz::{require, require_self_or};
use crate::context::Actor;

/// Id of the account created on first start when no admin exists.
pub const BOOTSTRAP_ADMIN_ID: &str = "admin";

/// An open loan as seen at some instant, with what returning it then would cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    pub transaction: Transaction,
    pub title: String,
    pub borrower: String,
    pub days_overdue: u64,
    pub accrued_fine: Money,
}

/// Catalog, directory and ledger behind one access-checked API.
///
/// Every operation checks the actor first and then delegates, so a denied
/// call leaves all three components untouched.
#[derive(Debug, Clone)]
pub struct Library<C = Sha256Credentials> {
    catalog: Catalog,
    directory: Directory<C>,
    ledger: Ledger,
}

impl Library<Sha256Credentials> {
    pub fn new(policy: LoanPolicy) -> Self {
        Self::with_credentials(Sha256Credentials, policy)
    }

    pub fn restore(snapshot: Snapshot, policy: LoanPolicy) -> DomainResult<Self> {
        Self::restore_with(Sha256Credentials, snapshot, policy)
    }
}

impl<C: CredentialService> Library<C> {
    pub fn with_credentials(credentials: C, policy: LoanPolicy) -> Self {
        Self {
            catalog: Catalog::new(),
            directory: Directory::with_credentials(credentials),
            ledger: Ledger::new(policy),
        }
    }

    /// Rebuild from persisted records, refusing snapshots whose counters and
    /// loans disagree.
    pub fn restore_with(credentials: C, snapshot: Snapshot, policy: LoanPolicy) -> DomainResult<Self> {
        let catalog = Catalog::from_books(snapshot.books)?;
        let directory = Directory::from_users(credentials, snapshot.users)?;
        let ledger = Ledger::from_transactions(policy, snapshot.transactions)?;

        if let Some(orphan) = ledger
            .transactions()
            .find(|t| !directory.contains(t.user_id()))
        {
            return Err(DomainError::conflict(format!(
                "transaction {} references unknown user {}",
                orphan.id_typed(),
                orphan.user_id()
            )));
        }
        ledger.verify_availability(&catalog)?;

        tracing::info!(
            books = catalog.len(),
            users = directory.len(),
            transactions = ledger.len(),
            "library restored"
        );
        Ok(Self {
            catalog,
            directory,
            ledger,
        })
    }

    /// Export every record for the store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            books: self.catalog.books().cloned().collect(),
            users: self.directory.users().cloned().collect(),
            transactions: self.ledger.transactions().cloned().collect(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn directory(&self) -> &Directory<C> {
        &self.directory
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn login(&self, id: &UserId, credential: &str) -> DomainResult<Actor> {
        let user = self.directory.authenticate(id, credential)?;
        tracing::debug!(user = %user.id, level = %user.access_level, "login");
        Ok(Actor::from_user(user))
    }

    /// Create the `admin` account when no admin exists yet.
    ///
    /// Returns whether an account was created.
    pub fn ensure_admin(&mut self, credential: &str, today: NaiveDate) -> DomainResult<bool> {
        if self.directory.has_admin() {
            return Ok(false);
        }
        let id = UserId::parse(BOOTSTRAP_ADMIN_ID)?;
        if self.directory.contains(&id) {
            return Err(DomainError::conflict(format!(
                "no admin exists and user {id} is taken by a non-admin account"
            )));
        }
        self.directory.register(NewUser {
            id: id.clone(),
            display_name: "Administrator".to_string(),
            email: None,
            access_level: AccessLevel::Admin,
            credential: credential.to_string(),
            registered_on: today,
        })?;
        tracing::warn!(user = %id, "no admin account found; created the bootstrap admin");
        Ok(true)
    }

    /// Stock an empty catalog with `books`.
    ///
    /// Returns the number of titles added. A catalog holding anything is left
    /// alone, and a bad entry leaves the catalog empty.
    pub fn seed_catalog(&mut self, books: impl IntoIterator<Item = NewBook>) -> DomainResult<usize> {
        if !self.catalog.is_empty() {
            return Ok(0);
        }
        let mut stocked = Catalog::new();
        for book in books {
            stocked.add_book(book)?;
        }
        let titles = stocked.len();
        self.catalog = stocked;
        tracing::info!(titles, "stocked empty catalog with starter titles");
        Ok(titles)
    }

    pub fn add_book(&mut self, actor: &Actor, new_book: NewBook) -> DomainResult<Book> {
        require(actor, Permission::ManageCatalog)?;
        let copies = new_book.copies;
        let book = self.catalog.add_book(new_book)?.clone();
        tracing::info!(
            actor = %actor.user_id(),
            isbn = %book.isbn,
            copies,
            total = book.total_copies(),
            "book copies added"
        );
        Ok(book)
    }

    /// Withdraw copies. `None` when the last copy went and the title was dropped.
    pub fn remove_book(&mut self, actor: &Actor, isbn: &Isbn, copies: u32) -> DomainResult<Option<Book>> {
        require(actor, Permission::ManageCatalog)?;
        let remaining = self.catalog.remove_book(isbn, copies)?.cloned();
        tracing::info!(
            actor = %actor.user_id(),
            %isbn,
            copies,
            remaining = remaining.as_ref().map_or(0, Book::total_copies),
            "book copies removed"
        );
        Ok(remaining)
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.catalog.books()
    }

    pub fn search<'a>(&'a self, query: &'a BookQuery) -> impl Iterator<Item = &'a Book> + 'a {
        self.catalog.search(move |book| query.matches(book))
    }

    /// Self-registration. The account is always a member.
    pub fn register_member(&mut self, mut new_user: NewUser) -> DomainResult<User> {
        new_user.access_level = AccessLevel::Member;
        let user = self.directory.register(new_user)?.clone();
        tracing::info!(user = %user.id, "member registered");
        Ok(user)
    }

    /// Registration by an administrator, at any access level.
    pub fn register_user(&mut self, actor: &Actor, new_user: NewUser) -> DomainResult<User> {
        require(actor, Permission::ManageUsers)?;
        let user = self.directory.register(new_user)?.clone();
        tracing::info!(
            actor = %actor.user_id(),
            user = %user.id,
            level = %user.access_level,
            "user registered"
        );
        Ok(user)
    }

    /// Change a user's access level. The last admin cannot be demoted.
    pub fn set_access_level(
        &mut self,
        actor: &Actor,
        target: &UserId,
        level: AccessLevel,
    ) -> DomainResult<User> {
        let demoting_admin = level != AccessLevel::Admin
            && self
                .directory
                .get(target)
                .is_some_and(|u| u.access_level == AccessLevel::Admin);
        if demoting_admin && actor.access_level() == AccessLevel::Admin {
            let admins = self
                .directory
                .users()
                .filter(|u| u.access_level == AccessLevel::Admin)
                .count();
            if admins <= 1 {
                return Err(DomainError::conflict(format!(
                    "{target} is the last admin and cannot be demoted"
                )));
            }
        }
        let user = self
            .directory
            .set_access_level(actor.access_level(), target, level)?
            .clone();
        tracing::info!(actor = %actor.user_id(), user = %user.id, %level, "access level changed");
        Ok(user)
    }

    pub fn change_password(&mut self, actor: &Actor, current: &str, new: &str) -> DomainResult<()> {
        self.directory
            .change_credential(actor.user_id(), current, new)?;
        tracing::info!(user = %actor.user_id(), "password changed");
        Ok(())
    }

    /// Lend a copy to `borrower`. Lending to anyone but oneself is a
    /// circulation-desk operation.
    pub fn issue_book(
        &mut self,
        actor: &Actor,
        borrower: &UserId,
        isbn: &Isbn,
        at: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        require(actor, Permission::BorrowBooks)?;
        require_self_or(actor, borrower, Permission::CirculateForOthers)?;

        let txn = self
            .ledger
            .issue_book(&mut self.catalog, &self.directory, borrower, isbn, at)?;
        tracing::info!(
            actor = %actor.user_id(),
            transaction = %txn.id_typed(),
            %isbn,
            borrower = %borrower,
            due = %txn.due_at(),
            "book issued"
        );
        Ok(txn)
    }

    /// Close a loan. Borrowers return their own; anyone else needs circulation rights.
    pub fn return_book(
        &mut self,
        actor: &Actor,
        transaction_id: TransactionId,
        at: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        let borrower = self
            .ledger
            .get(transaction_id)
            .map(|t| t.user_id().clone())
            .ok_or_else(|| DomainError::not_found(format!("transaction {transaction_id}")))?;
        require_self_or(actor, &borrower, Permission::CirculateForOthers)?;

        let txn = self
            .ledger
            .return_book(&mut self.catalog, transaction_id, at)?;
        tracing::info!(
            actor = %actor.user_id(),
            transaction = %transaction_id,
            isbn = %txn.isbn(),
            fine = %txn.fine().unwrap_or(Money::ZERO),
            "book returned"
        );
        Ok(txn)
    }

    /// Every overdue loan at `as_of`, earliest due first.
    pub fn overdue(&self, actor: &Actor, as_of: DateTime<Utc>) -> DomainResult<Vec<LoanView>> {
        require(actor, Permission::ViewOverdue)?;
        Ok(self
            .ledger
            .overdue_transactions(as_of)
            .map(|t| self.view(t, as_of))
            .collect())
    }

    pub fn history_for_user(&self, actor: &Actor, user_id: &UserId) -> DomainResult<Vec<Transaction>> {
        require_self_or(actor, user_id, Permission::CirculateForOthers)?;
        if !self.directory.contains(user_id) {
            return Err(DomainError::not_found(format!("user {user_id}")));
        }
        Ok(self.ledger.history_for_user(user_id).cloned().collect())
    }

    pub fn history_for_book(&self, actor: &Actor, isbn: &Isbn) -> DomainResult<Vec<Transaction>> {
        require(actor, Permission::CirculateForOthers)?;
        Ok(self.ledger.history_for_book(isbn).cloned().collect())
    }

    /// The actor's own open loans with the fine accrued by `as_of`.
    pub fn loans_of(&self, actor: &Actor, as_of: DateTime<Utc>) -> Vec<LoanView> {
        self.ledger
            .open_loans_for_user(actor.user_id())
            .map(|t| self.view(t, as_of))
            .collect()
    }

    fn view(&self, txn: &Transaction, as_of: DateTime<Utc>) -> LoanView {
        let title = self
            .catalog
            .get(txn.isbn())
            .map(|b| b.title.clone())
            .unwrap_or_else(|| txn.isbn().to_string());
        let borrower = self
            .directory
            .get(txn.user_id())
            .map(|u| u.display_name.clone())
            .unwrap_or_else(|| txn.user_id().to_string());
        LoanView {
            transaction: txn.clone(),
            title,
            borrower,
            days_overdue: LoanPolicy::overdue_days(txn.due_at(), as_of),
            accrued_fine: self.ledger.accrued_fine(txn, as_of),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use libris_core::ErrorKind;

    fn isbn(s: &str) -> Isbn {
        Isbn::parse(s).unwrap()
    }

    fn uid(s: &str) -> UserId {
        UserId::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn new_user(id: &str, level: AccessLevel) -> NewUser {
        NewUser {
            id: uid(id),
            display_name: id.to_string(),
            email: None,
            access_level: level,
            credential: format!("{id}-pw"),
            registered_on: day(),
        }
    }

    fn new_book(raw: &str, copies: u32) -> NewBook {
        NewBook {
            isbn: isbn(raw),
            title: format!("Title {raw}"),
            author: "Author".to_string(),
            category: "General".to_string(),
            publisher: None,
            year: None,
            copies,
        }
    }

    /// admin, a librarian `lib`, members `ann` and `ben`, and two copies of `111`.
    fn seeded() -> (Library, Actor) {
        let mut library = Library::new(LoanPolicy::new(14, Money::from_minor(50)).unwrap());
        library.ensure_admin("secret", day()).unwrap();
        let admin = library.login(&uid("admin"), "secret").unwrap();
        library
            .register_user(&admin, new_user("lib", AccessLevel::Librarian))
            .unwrap();
        library.register_member(new_user("ann", AccessLevel::Member)).unwrap();
        library.register_member(new_user("ben", AccessLevel::Member)).unwrap();
        library.add_book(&admin, new_book("111", 2)).unwrap();
        (library, admin)
    }

    fn login(library: &Library, id: &str) -> Actor {
        library.login(&uid(id), &format!("{id}-pw")).unwrap()
    }

    fn kind<T: std::fmt::Debug>(result: DomainResult<T>) -> ErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn ensure_admin_runs_once() {
        let mut library = Library::new(LoanPolicy::default());
        assert!(library.ensure_admin("secret", day()).unwrap());
        assert!(!library.ensure_admin("other", day()).unwrap());

        let admin = library.login(&uid("admin"), "secret").unwrap();
        assert_eq!(admin.access_level(), AccessLevel::Admin);
        assert_eq!(kind(library.login(&uid("admin"), "other")), ErrorKind::Auth);
    }

    #[test]
    fn self_registration_is_always_member() {
        let mut library = Library::new(LoanPolicy::default());
        let user = library
            .register_member(new_user("eve", AccessLevel::Admin))
            .unwrap();
        assert_eq!(user.access_level, AccessLevel::Member);
    }

    #[test]
    fn catalog_changes_need_librarian_or_admin() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        let lib = login(&library, "lib");

        assert_eq!(kind(library.add_book(&ann, new_book("222", 1))), ErrorKind::Permission);
        assert_eq!(kind(library.remove_book(&ann, &isbn("111"), 1)), ErrorKind::Permission);
        assert!(!library.catalog().contains(&isbn("222")));

        library.add_book(&lib, new_book("222", 1)).unwrap();
        assert!(library.remove_book(&lib, &isbn("222"), 1).unwrap().is_none());
    }

    #[test]
    fn only_admin_registers_staff() {
        let (mut library, _) = seeded();
        let lib = login(&library, "lib");
        assert_eq!(
            kind(library.register_user(&lib, new_user("zed", AccessLevel::Librarian))),
            ErrorKind::Permission
        );
        assert!(!library.directory().contains(&uid("zed")));
    }

    #[test]
    fn members_borrow_for_themselves_only() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");

        assert_eq!(
            kind(library.issue_book(&ann, &uid("ben"), &isbn("111"), noon())),
            ErrorKind::Permission
        );
        assert_eq!(library.catalog().get(&isbn("111")).unwrap().available_copies(), 2);

        let txn = library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();
        assert_eq!(txn.user_id(), &uid("ann"));
    }

    #[test]
    fn librarian_issues_and_returns_for_others() {
        let (mut library, _) = seeded();
        let lib = login(&library, "lib");

        let txn = library.issue_book(&lib, &uid("ben"), &isbn("111"), noon()).unwrap();
        let closed = library
            .return_book(&lib, txn.id_typed(), noon() + TimeDelta::days(1))
            .unwrap();
        assert_eq!(closed.fine(), Some(Money::ZERO));
    }

    #[test]
    fn members_cannot_return_someone_elses_loan() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        let ben = login(&library, "ben");

        let txn = library.issue_book(&ben, &uid("ben"), &isbn("111"), noon()).unwrap();
        assert_eq!(
            kind(library.return_book(&ann, txn.id_typed(), noon())),
            ErrorKind::Permission
        );
        assert!(library.ledger().get(txn.id_typed()).unwrap().is_open());

        library.return_book(&ben, txn.id_typed(), noon()).unwrap();
    }

    #[test]
    fn returning_unknown_transaction_is_not_found() {
        let (mut library, admin) = seeded();
        assert_eq!(
            kind(library.return_book(&admin, TransactionId::new(99), noon())),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn overdue_listing_is_staff_only_and_priced() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        let lib = login(&library, "lib");
        library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();

        let as_of = noon() + TimeDelta::days(17);
        assert_eq!(kind(library.overdue(&ann, as_of)), ErrorKind::Permission);

        let overdue = library.overdue(&lib, as_of).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "Title 111");
        assert_eq!(overdue[0].borrower, "ann");
        assert_eq!(overdue[0].days_overdue, 3);
        assert_eq!(overdue[0].accrued_fine, Money::from_minor(150));

        let mine = library.loans_of(&ann, as_of);
        assert_eq!(mine, overdue);
    }

    #[test]
    fn history_visibility() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        let lib = login(&library, "lib");
        library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();

        assert_eq!(library.history_for_user(&ann, &uid("ann")).unwrap().len(), 1);
        assert_eq!(kind(library.history_for_user(&ann, &uid("ben"))), ErrorKind::Permission);
        assert_eq!(kind(library.history_for_book(&ann, &isbn("111"))), ErrorKind::Permission);
        assert_eq!(library.history_for_book(&lib, &isbn("111")).unwrap().len(), 1);
        assert_eq!(kind(library.history_for_user(&lib, &uid("nobody"))), ErrorKind::NotFound);
    }

    #[test]
    fn last_admin_cannot_be_demoted() {
        let (mut library, admin) = seeded();
        assert_eq!(
            kind(library.set_access_level(&admin, &uid("admin"), AccessLevel::Member)),
            ErrorKind::Conflict
        );

        library
            .set_access_level(&admin, &uid("lib"), AccessLevel::Admin)
            .unwrap();
        library
            .set_access_level(&admin, &uid("admin"), AccessLevel::Member)
            .unwrap();
        assert!(library.directory().has_admin());
    }

    #[test]
    fn change_password_checks_current() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        assert_eq!(kind(library.change_password(&ann, "wrong", "new")), ErrorKind::Auth);
        library.change_password(&ann, "ann-pw", "new").unwrap();
        assert!(library.login(&uid("ann"), "new").is_ok());
    }

    #[test]
    fn snapshot_restores_to_the_same_state() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();

        let restored = Library::restore(library.snapshot(), LoanPolicy::default()).unwrap();
        assert_eq!(restored.snapshot(), library.snapshot());
        assert_eq!(restored.catalog().get(&isbn("111")).unwrap().available_copies(), 1);
    }

    #[test]
    fn restore_rejects_counters_that_disagree_with_loans() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();

        let mut snapshot = library.snapshot();
        snapshot.transactions.clear();
        let err = Library::restore(snapshot, LoanPolicy::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn restore_rejects_loans_of_unknown_users() {
        let (mut library, _) = seeded();
        let ann = login(&library, "ann");
        library.issue_book(&ann, &uid("ann"), &isbn("111"), noon()).unwrap();

        let mut snapshot = library.snapshot();
        snapshot.users.retain(|u| u.id != uid("ann"));
        let err = Library::restore(snapshot, LoanPolicy::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn seeding_stocks_only_an_empty_catalog() {
        let mut library = Library::new(LoanPolicy::default());
        let added = library
            .seed_catalog([new_book("111", 2), new_book("222", 1)])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(library.catalog().get(&isbn("222")).unwrap().available_copies(), 1);

        assert_eq!(library.seed_catalog([new_book("333", 1)]).unwrap(), 0);
        assert!(library.catalog().get(&isbn("333")).is_none());
    }

    #[test]
    fn bad_starter_entry_leaves_the_catalog_empty() {
        let mut library = Library::new(LoanPolicy::default());
        let err = library
            .seed_catalog([new_book("111", 2), new_book("222", 0)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(library.catalog().is_empty());
    }
}
