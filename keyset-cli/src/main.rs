//! keyset CLI
//!
//! Command-line interface for paging through SQLite tables by sort key.
//!
//! # Commands
//!
//! - `page` - Print one page and its navigation tokens
//! - `walk` - Follow next (or previous) tokens to the end

mod cli;
mod config;
mod output;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::runner::InvalidPage;

/// Exit status for a rejected page token.
const EXIT_INVALID_PAGE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(invalid) = err.downcast_ref::<InvalidPage>() {
                eprintln!("{invalid}");
                return ExitCode::from(EXIT_INVALID_PAGE);
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

/// Logs go to stderr so stdout stays valid JSON lines.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
