//! # queryguard CLI
//!
//! Command-line demonstration of the query enhancement pipeline: loads a
//! constraint book, enhances one query against a named profile, and prints
//! the result.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use queryguard::ConstraintBook;

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let book = match ConstraintBook::load_from_path(&cli.constraints) {
        Ok(book) => book,
        Err(e) => {
            tracing::error!(error = %e, "failed to load constraint book");
            return ExitCode::FAILURE;
        }
    };

    let constraints = match book.profile(&cli.profile) {
        Ok(constraints) => constraints,
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve constraint profile");
            return ExitCode::FAILURE;
        }
    };

    match queryguard::enhance(&cli.query, cli.language.into(), constraints) {
        Ok(result) => {
            println!("{}", result.query);
            if !result.synthesized_labels.is_empty() {
                tracing::info!(labels = ?result.synthesized_labels, "synthesized missing constraints");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
