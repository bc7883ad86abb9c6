//! Top-level query enhancement pipeline (`spec.md` §4.1, §4.8), generalizing
//! `query_engine.rs::SimpleQueryEngine::parse_selector`'s top-level
//! dispatch into a full parse → normalize → enforce → synthesize →
//! serialize flow across every top-level `{...}` section of a query.

use std::collections::HashSet;

use crate::constraints::ConstraintMap;
use crate::dialect::{self, Language};
use crate::enhancer;
use crate::error::EnhanceError;
use crate::normalizer;
use crate::parser;
use crate::scanner::{self, MAX_INPUT_LEN};
use crate::serializer;
use crate::synthesizer;

/// The outcome of a successful enhancement: the rewritten query text, plus
/// the constraint-map labels that were appended because the original query
/// did not already mention them (useful for audit logging — never parsed
/// back out of the query text itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementResult {
    pub query: String,
    pub synthesized_labels: Vec<String>,
}

/// Enhance `query`, written in `language`, so that every label selector it
/// contains is provably constrained by `constraints`.
///
/// Returns [`EnhanceError::UsageError`] for a null/oversized input,
/// [`EnhanceError::Unauthorized`] if any selector demands data outside the
/// caller's allowed values, and [`EnhanceError::EnhancementFailure`] for any
/// other internal failure (e.g. a malformed regex constraint).
pub fn enhance(
    query: &str,
    language: Language,
    constraints: &ConstraintMap,
) -> Result<EnhancementResult, EnhanceError> {
    let trimmed = query.trim();
    if trimmed.len() > MAX_INPUT_LEN {
        return Err(EnhanceError::UsageError(format!(
            "query exceeds maximum length of {MAX_INPUT_LEN} characters"
        )));
    }
    if scanner::has_unbalanced_quote_or_brace(trimmed) {
        return Err(EnhanceError::UsageError(
            "malformed query: unclosed quote or unbalanced braces".to_string(),
        ));
    }

    let syntax = dialect::syntax_for(language);

    // Disjunction (`||`) is an unsupported-in-scope limitation of *trace*
    // selectors only (`spec.md` §1 Non-goals: "disjunctions (`||`) in trace
    // selectors"); PromQL and LogQL never had it in scope to reject, so a
    // bare `||` appearing anywhere in one of those queries must not trip
    // this check.
    if language == Language::TraceQl && scanner::contains_top_level_disjunction(trimmed) {
        return Err(EnhanceError::Unauthorized(
            "Unauthorized label value: disjunction (||) in selector is not supported".to_string(),
        ));
    }

    let sections = scanner::find_label_sections(query);
    let mut synthesized_labels = HashSet::new();

    let enhanced_query = if sections.is_empty() {
        // No selector at all: synthesize one wholly new section and append
        // it, in the dialect's own selector syntax (`spec.md` §4.1 step 1).
        // When nothing is synthesized, the original query is returned
        // unchanged, not a trimmed copy of it (`spec.md` §4.8 step 1).
        let present_names = HashSet::new();
        let synthesized = synthesizer::synthesize_missing(constraints, &present_names);
        if synthesized.is_empty() {
            query.to_string()
        } else {
            for expr in &synthesized {
                synthesized_labels.insert(expr.name.clone());
            }
            let body = serializer::serialize_section(&synthesized, syntax);
            format!("{query}{{{body}}}")
        }
    } else {
        let mut failure: Option<EnhanceError> = None;
        let result = scanner::replace_label_sections(query, |inner| {
            if failure.is_some() {
                return inner.to_string();
            }
            match enhance_section(inner, syntax, constraints) {
                Ok((rendered, names)) => {
                    synthesized_labels.extend(names);
                    rendered
                }
                Err(e) => {
                    failure = Some(e);
                    inner.to_string()
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        result
    };

    let mut synthesized_labels: Vec<String> = synthesized_labels.into_iter().collect();
    synthesized_labels.sort();

    Ok(EnhancementResult { query: enhanced_query, synthesized_labels })
}

/// Parse, normalize, enforce, and synthesize for a single `{...}` section,
/// returning its rendered replacement text and the names it synthesized.
fn enhance_section(
    inner: &str,
    syntax: &dialect::QuerySyntax,
    constraints: &ConstraintMap,
) -> Result<(String, Vec<String>), EnhanceError> {
    let Some(parsed) = parser::parse_section(inner, syntax) else {
        return Err(EnhanceError::UsageError(
            "malformed label selector: unclosed quote or unbalanced braces".to_string(),
        ));
    };

    let mut present_names: HashSet<&str> = HashSet::new();
    let mut kept = Vec::with_capacity(parsed.len());

    for expr in &parsed {
        if !expr.passthrough {
            present_names.insert(expr.name.as_str());
        }

        // Reserved keys carry meta-policy, never a label constraint: even if
        // a query happens to use one as a literal label name, it must never
        // be looked up or enforced against (`spec.md` §3, §4.6).
        let av = if crate::pattern::RESERVED_KEYS.contains(&expr.name.as_str()) {
            None
        } else {
            constraints.get(&expr.name).map(Vec::as_slice)
        };
        let normalized = normalizer::normalize(expr, av);

        if let Some(enforced) = enhancer::enhance(&normalized, av)? {
            kept.push(enforced);
        }
    }

    let synthesized = synthesizer::synthesize_missing(constraints, &present_names);
    let synthesized_names: Vec<String> = synthesized.iter().map(|e| e.name.clone()).collect();
    kept.extend(synthesized);

    Ok((serializer::serialize_section(&kept, syntax), synthesized_names))
}
