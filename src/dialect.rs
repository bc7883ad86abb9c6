//! Per-query-language syntax records: separators, operator precedence,
//! passthrough keywords, and intrinsic-attribute recognition.
//!
//! These tables are immutable and built once (REDESIGN FLAG: fold a
//! "global operator-strategy registry reinitialized per call" into an
//! immutable module-level table), the way `dsemak-prom-mock-rs`'s
//! `AppState`/`QueryConfig` are built once and cloned cheaply thereafter.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::expression::Operator;

/// The three backend query languages this core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    PromQl,
    LogQl,
    TraceQl,
}

/// How a selector's pairs are split at depth 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSeparator {
    /// Split on a single character (`,` for PromQL/LogQL).
    Char(char),
    /// Split on the literal token `&&`, whitespace-insensitive (TraceQL).
    AndAnd,
}

/// A dialect's selector syntax.
pub struct QuerySyntax {
    pub language: Language,
    pub separator: PairSeparator,
    /// Rendered separator text used when serializing pairs back together.
    pub render_separator: &'static str,
    /// Operator precedence, longest-first. Always `Operator::PRECEDENCE`
    /// today; kept as a field per `spec.md` §3 so a future dialect could
    /// diverge without changing the parser's signature.
    pub operator_precedence: [Operator; 4],
    pub passthrough_keywords: &'static Lazy<HashSet<&'static str>>,
    pub is_intrinsic: fn(&str) -> bool,
    /// Whether a section's inner content may still be brace-wrapped after
    /// extraction and needs stripping (defensive; all three dialects strip
    /// braces the same way today).
    pub brace_stripping: bool,
}

fn promql_logql_intrinsic(_name: &str) -> bool {
    false
}

static EMPTY_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(HashSet::new);

static PROMQL_SYNTAX: QuerySyntax = QuerySyntax {
    language: Language::PromQl,
    separator: PairSeparator::Char(','),
    render_separator: ",",
    operator_precedence: Operator::PRECEDENCE,
    passthrough_keywords: &EMPTY_KEYWORDS,
    is_intrinsic: promql_logql_intrinsic,
    brace_stripping: true,
};

static LOGQL_SYNTAX: QuerySyntax = QuerySyntax {
    language: Language::LogQl,
    separator: PairSeparator::Char(','),
    render_separator: ",",
    operator_precedence: Operator::PRECEDENCE,
    passthrough_keywords: &EMPTY_KEYWORDS,
    is_intrinsic: promql_logql_intrinsic,
    brace_stripping: true,
};

/// Dialect-reserved TraceQL attribute names: non-user labels whose name
/// validation and enforcement are bypassed (`spec.md` §3 Glossary).
const TRACEQL_INTRINSICS: &[&str] =
    &["status", "duration", "kind", "name", "nestedSetParent", "rootServiceName", "rootSpanName"];

fn traceql_is_intrinsic(name: &str) -> bool {
    TRACEQL_INTRINSICS.contains(&name)
}

static TRACEQL_KEYWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["true", "false"].into_iter().collect());

static TRACEQL_SYNTAX: QuerySyntax = QuerySyntax {
    language: Language::TraceQl,
    separator: PairSeparator::AndAnd,
    render_separator: " && ",
    operator_precedence: Operator::PRECEDENCE,
    passthrough_keywords: &TRACEQL_KEYWORDS,
    is_intrinsic: traceql_is_intrinsic,
    brace_stripping: true,
};

/// Look up the immutable syntax record for `language`.
pub fn syntax_for(language: Language) -> &'static QuerySyntax {
    match language {
        Language::PromQl => &PROMQL_SYNTAX,
        Language::LogQl => &LOGQL_SYNTAX,
        Language::TraceQl => &TRACEQL_SYNTAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traceql_recognizes_documented_intrinsics() {
        let syntax = syntax_for(Language::TraceQl);
        assert!((syntax.is_intrinsic)("status"));
        assert!((syntax.is_intrinsic)("duration"));
        assert!((syntax.is_intrinsic)("nestedSetParent"));
        assert!(!(syntax.is_intrinsic)("service.name"));
    }

    #[test]
    fn promql_has_no_intrinsics_or_keywords() {
        let syntax = syntax_for(Language::PromQl);
        assert!(!(syntax.is_intrinsic)("status"));
        assert!(syntax.passthrough_keywords.is_empty());
    }

    #[test]
    fn traceql_keyword_set_contains_bare_booleans() {
        let syntax = syntax_for(Language::TraceQl);
        assert!(syntax.passthrough_keywords.contains("true"));
        assert!(syntax.passthrough_keywords.contains("false"));
    }
}
