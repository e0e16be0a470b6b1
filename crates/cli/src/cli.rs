//! Command-line surface of the `libris` binary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use libris_catalog::SearchField;
use libris_directory::AccessLevel;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Library catalog, members and loans")]
pub struct App {
    /// TOML configuration file.
    #[arg(long, global = true, env = "LIBRIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Act as this user.
    #[arg(long, global = true, env = "LIBRIS_USER")]
    pub user: Option<String>,

    /// Password for `--user`.
    #[arg(long, global = true, env = "LIBRIS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage and browse the catalog.
    #[command(subcommand)]
    Book(BookCommand),
    /// Register users and manage accounts.
    #[command(subcommand)]
    User(UserCommand),
    /// Issue, return and report on loans.
    #[command(subcommand)]
    Loan(LoanCommand),
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    /// Add copies of a title, creating it if new.
    Add(AddBookArgs),
    /// Withdraw copies; the title is dropped with its last copy.
    Remove {
        isbn: String,
        #[arg(long, default_value_t = 1)]
        copies: u32,
    },
    /// List the whole catalog.
    List,
    /// Case-insensitive substring search.
    Search {
        term: String,
        #[arg(long, value_enum)]
        field: Option<FieldArg>,
    },
}

#[derive(Debug, Args)]
pub struct AddBookArgs {
    pub isbn: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long, default_value = "General")]
    pub category: String,
    #[arg(long)]
    pub publisher: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long, default_value_t = 1)]
    pub copies: u32,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an account. Without admin credentials the account is a member.
    Register(RegisterArgs),
    /// Change a user's access level (admin only).
    SetLevel {
        id: String,
        #[arg(value_enum)]
        level: LevelArg,
    },
    /// Change your own password.
    Passwd {
        #[arg(long)]
        new: String,
    },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    /// Password for the new account.
    #[arg(long = "new-password")]
    pub new_password: String,
    #[arg(long, value_enum, default_value_t = LevelArg::Member)]
    pub level: LevelArg,
}

#[derive(Debug, Subcommand)]
pub enum LoanCommand {
    /// Borrow a book, or lend it to `--for` at the desk.
    Issue {
        isbn: String,
        #[arg(long = "for")]
        borrower: Option<String>,
        #[command(flatten)]
        at: AtArg,
    },
    /// Return a loan by transaction id (`T7` or `7`).
    Return {
        transaction: String,
        #[command(flatten)]
        at: AtArg,
    },
    /// Overdue loans, earliest due first.
    Overdue {
        #[command(flatten)]
        at: AtArg,
    },
    /// Loan history of a user (default: yourself) or of a book.
    History {
        #[arg(long = "of", conflicts_with = "isbn")]
        member: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
    },
    /// Your open loans and what they would cost today.
    Mine {
        #[command(flatten)]
        at: AtArg,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AtArg {
    /// Instant to act at (RFC 3339); defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
}

impl AtArg {
    pub fn resolve(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    Title,
    Author,
    Isbn,
    Category,
}

impl From<FieldArg> for SearchField {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Title => SearchField::Title,
            FieldArg::Author => SearchField::Author,
            FieldArg::Isbn => SearchField::Isbn,
            FieldArg::Category => SearchField::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Member,
    Librarian,
    Admin,
}

impl From<LevelArg> for AccessLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Member => AccessLevel::Member,
            LevelArg::Librarian => AccessLevel::Librarian,
            LevelArg::Admin => AccessLevel::Admin,
        }
    }
}
