//! Error types surfaced by the query enforcement core.

use thiserror::Error;

/// Errors returned by [`crate::orchestrator::enhance`].
///
/// `PairParseError` from `spec.md` §7 is deliberately absent here: a
/// malformed label pair is logged and dropped at the parser stage (see
/// `parser.rs`) and never escapes a single call to `enhance`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnhanceError {
    /// Raised before enforcement runs: a null/blank input or an invalid
    /// label name in the constraint map itself.
    #[error("usage error: {0}")]
    UsageError(String),

    /// The query demands data the caller is not allowed to read. The
    /// message always begins with the literal `Unauthorized label value: `
    /// per the external contract in `spec.md` §6 — callers pattern-match on
    /// that prefix, so it is not lower-cased like the other variants.
    #[error("{0}")]
    Unauthorized(String),

    /// Any other internal failure during enhancement. The original query is
    /// never included in this message, so it is safe to forward to a
    /// generic 5xx response.
    #[error("enhancement failure: {0}")]
    EnhancementFailure(String),
}

impl EnhanceError {
    /// Build an `Unauthorized` error with the mandated message prefix.
    pub fn unauthorized(value: impl std::fmt::Display) -> Self {
        Self::Unauthorized(format!("Unauthorized label value: {value}"))
    }
}

/// Errors raised while loading a [`crate::constraints::ConstraintBook`] from
/// disk, in the style of `FixtureError` in the teacher repository.
#[derive(Debug, Error)]
pub enum ConstraintBookError {
    /// I/O error while reading the book file.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The requested profile name is not present in the book.
    #[error("no such constraint profile: {0}")]
    UnknownProfile(String),
}
