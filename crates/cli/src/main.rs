use std::process::ExitCode;

use clap::Parser;

use libris_cli::{App, exit_code, run};

fn main() -> ExitCode {
    let app = App::parse();

    match run(&app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
