//! Command-line interface definitions for the queryguard demonstration binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for the queryguard demonstration binary.
///
/// This structure defines all command-line options for running one query
/// through the enhancement pipeline and printing the result.
#[derive(Debug, Parser)]
#[command(name = "queryguard")]
#[command(author, version, about = "Enhance a PromQL/LogQL/TraceQL query against a constraint profile")]
pub struct Cli {
    /// The query text to enhance
    #[arg(long)]
    pub query: String,

    /// Query language
    #[arg(long, value_enum, default_value_t = CliLanguage::Promql)]
    pub language: CliLanguage,

    /// Path to the YAML constraint book
    #[arg(long)]
    pub constraints: PathBuf,

    /// Named profile within the constraint book to enforce
    #[arg(long)]
    pub profile: String,
}

/// CLI-facing mirror of [`queryguard::Language`] (clap needs a type it can
/// derive `ValueEnum` for directly).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliLanguage {
    Promql,
    Logql,
    Traceql,
}

impl From<CliLanguage> for queryguard::Language {
    fn from(value: CliLanguage) -> Self {
        match value {
            CliLanguage::Promql => queryguard::Language::PromQl,
            CliLanguage::Logql => queryguard::Language::LogQl,
            CliLanguage::Traceql => queryguard::Language::TraceQl,
        }
    }
}
