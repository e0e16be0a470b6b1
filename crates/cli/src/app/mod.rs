//! Application wiring for the `libris` binary.
//!
//! - `library.rs`: the access-checked service over catalog, directory and ledger
//! - `commands.rs`: one function per command group, printing results
//! - `render.rs`: plain-text output lines
//! - `seed.rs`: starter titles for an empty catalog
//! - `errors.rs`: exit codes for failures

use std::io::Write;

use anyhow::Context;
use chrono::Utc;

use libris_store::{JsonFileStore, Store};

use crate::cli::App;
use crate::config::Config;

pub mod commands;
pub mod errors;
pub mod library;
pub mod render;
pub mod seed;

pub use commands::{Session, execute};
pub use errors::exit_code;
pub use library::{BOOTSTRAP_ADMIN_ID, Library, LoanView};

const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Full binary flow: configuration, logging, the JSON store, stdout.
pub fn run(app: &App) -> anyhow::Result<()> {
    let config = Config::load(app.config.as_deref()).context("loading configuration")?;
    libris_observability::init(config.log_format);

    let store = JsonFileStore::new(&config.data_dir);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(app, &config, &store, &mut out)
}

/// Load, restore, bootstrap, run one command, save if anything changed.
///
/// The bootstrap admin and starter titles are saved even when the command
/// itself fails.
pub fn run_with<S, W>(app: &App, config: &Config, store: &S, out: &mut W) -> anyhow::Result<()>
where
    S: Store,
    W: Write,
{
    let policy = config.loan_policy()?;
    let snapshot = store.load().context("loading library data")?;
    let mut library = Library::restore(snapshot, policy).context("restoring library state")?;

    let bootstrapped = if library.directory().has_admin() {
        false
    } else {
        let password = config.bootstrap_admin_password.clone().unwrap_or_else(|| {
            tracing::warn!("LIBRIS_ADMIN_PASSWORD not set; using insecure dev default");
            DEV_ADMIN_PASSWORD.to_string()
        });
        library.ensure_admin(&password, Utc::now().date_naive())?
    };

    let seeded = config.seed_catalog && library.seed_catalog(seed::starter_books()?)? > 0;

    let session = Session::new(app.user.clone(), app.password.clone());
    let result = execute(&mut library, &session, &app.command, out);

    let mutated = matches!(result, Ok(true));
    if mutated || bootstrapped || seeded {
        store
            .save(&library.snapshot())
            .context("saving library data")?;
    }
    result.map(|_| ())
}
