//! `libris` command-line front end: configuration, the library service and
//! command dispatch.

pub mod app;
pub mod authz;
pub mod cli;
pub mod config;
pub mod context;

pub use app::{Library, LoanView, Session, exit_code, run, run_with};
pub use cli::App;
pub use config::{Config, ConfigError};
pub use context::Actor;
