//! Dispatch of parsed commands onto the library service.

use std::io::Write;

use anyhow::Context;
use chrono::Utc;

use libris_catalog::{BookQuery, NewBook};
use libris_core::{DomainError, Isbn, TransactionId, UserId};
use libris_directory::{AccessLevel, CredentialService, NewUser};

use super::library::Library;
use super::render;
use crate::cli::{BookCommand, Command, LevelArg, LoanCommand, RegisterArgs, UserCommand};
use crate::context::Actor;

/// Credentials given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Session {
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        Self { user, password }
    }

    fn has_credentials(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }

    fn password(&self) -> anyhow::Result<&str> {
        self.password
            .as_deref()
            .ok_or(DomainError::Auth)
            .context("this command needs --password")
    }

    fn login<C: CredentialService>(&self, library: &Library<C>) -> anyhow::Result<Actor> {
        let user = self
            .user
            .as_deref()
            .ok_or(DomainError::Auth)
            .context("this command needs --user and --password")?;
        let id = UserId::parse(user)?;
        Ok(library.login(&id, self.password()?)?)
    }
}

/// Run one command, writing its output to `out`.
///
/// Returns whether library state changed and needs saving.
pub fn execute<C, W>(
    library: &mut Library<C>,
    session: &Session,
    command: &Command,
    out: &mut W,
) -> anyhow::Result<bool>
where
    C: CredentialService,
    W: Write,
{
    match command {
        Command::Book(cmd) => book(library, session, cmd, out),
        Command::User(cmd) => user(library, session, cmd, out),
        Command::Loan(cmd) => loan(library, session, cmd, out),
    }
}

fn book<C: CredentialService, W: Write>(
    library: &mut Library<C>,
    session: &Session,
    command: &BookCommand,
    out: &mut W,
) -> anyhow::Result<bool> {
    match command {
        BookCommand::Add(args) => {
            let actor = session.login(library)?;
            let book = library.add_book(
                &actor,
                NewBook {
                    isbn: Isbn::parse(&args.isbn)?,
                    title: args.title.clone(),
                    author: args.author.clone(),
                    category: args.category.clone(),
                    publisher: args.publisher.clone(),
                    year: args.year,
                    copies: args.copies,
                },
            )?;
            writeln!(out, "added {} copies", args.copies)?;
            writeln!(out, "{}", render::book_line(&book))?;
            Ok(true)
        }
        BookCommand::Remove { isbn, copies } => {
            let actor = session.login(library)?;
            let isbn = Isbn::parse(isbn)?;
            match library.remove_book(&actor, &isbn, *copies)? {
                Some(book) => writeln!(out, "{}", render::book_line(&book))?,
                None => writeln!(out, "{isbn} withdrawn from the catalog")?,
            }
            Ok(true)
        }
        BookCommand::List => {
            let mut empty = true;
            for book in library.books() {
                empty = false;
                writeln!(out, "{}", render::book_line(book))?;
            }
            if empty {
                writeln!(out, "catalog is empty")?;
            }
            Ok(false)
        }
        BookCommand::Search { term, field } => {
            let query = match field {
                Some(field) => BookQuery::field((*field).into(), term),
                None => BookQuery::any(term),
            };
            let mut hits = 0usize;
            for book in library.search(&query) {
                hits += 1;
                writeln!(out, "{}", render::book_line(book))?;
            }
            if hits == 0 {
                writeln!(out, "no books match '{term}'")?;
            }
            Ok(false)
        }
    }
}

fn user<C: CredentialService, W: Write>(
    library: &mut Library<C>,
    session: &Session,
    command: &UserCommand,
    out: &mut W,
) -> anyhow::Result<bool> {
    match command {
        UserCommand::Register(args) => {
            let new_user = new_user(args)?;
            let user = if args.level == LevelArg::Member && !session.has_credentials() {
                library.register_member(new_user)?
            } else {
                let actor = session
                    .login(library)
                    .context("registering staff accounts needs admin credentials")?;
                library.register_user(&actor, new_user)?
            };
            writeln!(out, "registered {}", render::user_line(&user))?;
            Ok(true)
        }
        UserCommand::SetLevel { id, level } => {
            let actor = session.login(library)?;
            let user = library.set_access_level(&actor, &UserId::parse(id)?, (*level).into())?;
            writeln!(out, "{}", render::user_line(&user))?;
            Ok(true)
        }
        UserCommand::Passwd { new } => {
            let actor = session.login(library)?;
            library.change_password(&actor, session.password()?, new)?;
            writeln!(out, "password changed for {}", actor.user_id())?;
            Ok(true)
        }
    }
}

fn new_user(args: &RegisterArgs) -> anyhow::Result<NewUser> {
    Ok(NewUser {
        id: UserId::parse(&args.id)?,
        display_name: args.name.clone(),
        email: args.email.clone(),
        access_level: AccessLevel::from(args.level),
        credential: args.new_password.clone(),
        registered_on: Utc::now().date_naive(),
    })
}

fn loan<C: CredentialService, W: Write>(
    library: &mut Library<C>,
    session: &Session,
    command: &LoanCommand,
    out: &mut W,
) -> anyhow::Result<bool> {
    let actor = session.login(library)?;
    match command {
        LoanCommand::Issue { isbn, borrower, at } => {
            let borrower = match borrower {
                Some(raw) => UserId::parse(raw)?,
                None => actor.user_id().clone(),
            };
            let txn = library.issue_book(&actor, &borrower, &Isbn::parse(isbn)?, at.resolve())?;
            writeln!(out, "issued {}", render::transaction_line(&txn))?;
            Ok(true)
        }
        LoanCommand::Return { transaction, at } => {
            let id: TransactionId = transaction.parse()?;
            let txn = library.return_book(&actor, id, at.resolve())?;
            writeln!(out, "returned {}", render::transaction_line(&txn))?;
            Ok(true)
        }
        LoanCommand::Overdue { at } => {
            let overdue = library.overdue(&actor, at.resolve())?;
            if overdue.is_empty() {
                writeln!(out, "no overdue loans")?;
            }
            for loan in &overdue {
                writeln!(out, "{}", render::loan_line(loan))?;
            }
            Ok(false)
        }
        LoanCommand::History { member, isbn } => {
            let history = match (member, isbn) {
                (_, Some(isbn)) => library.history_for_book(&actor, &Isbn::parse(isbn)?)?,
                (Some(member), None) => library.history_for_user(&actor, &UserId::parse(member)?)?,
                (None, None) => library.history_for_user(&actor, actor.user_id())?,
            };
            if history.is_empty() {
                writeln!(out, "no loans recorded")?;
            }
            for txn in &history {
                writeln!(out, "{}", render::transaction_line(txn))?;
            }
            Ok(false)
        }
        LoanCommand::Mine { at } => {
            let loans = library.loans_of(&actor, at.resolve());
            if loans.is_empty() {
                writeln!(out, "no open loans")?;
            }
            for loan in &loans {
                writeln!(out, "{}", render::loan_line(loan))?;
            }
            Ok(false)
        }
    }
}
