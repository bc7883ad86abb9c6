//! Appends selectors for constraint-map labels the query's section did not
//! already mention (`spec.md` §4.6).

use std::collections::HashSet;

use crate::constraints::ConstraintMap;
use crate::expression::{LabelExpression, Operator};
use crate::pattern;

/// Build the synthesized expressions for labels in `constraints` that are
/// not already covered by `present_names` (the non-passthrough expression
/// names already in this section). Reserved keys, absent/empty allowed-value
/// sets, and wildcard-valued constraints are all skipped — they carry no
/// enforceable information or require no enforcement at all.
///
/// Iteration follows `constraints`' own (deterministic, sorted-by-key)
/// order, per the ordering guarantee in `spec.md` §5.
pub fn synthesize_missing(
    constraints: &ConstraintMap,
    present_names: &HashSet<&str>,
) -> Vec<LabelExpression> {
    let mut synthesized = Vec::new();
    for (name, values) in constraints {
        if pattern::RESERVED_KEYS.contains(&name.as_str()) {
            continue;
        }
        if present_names.contains(name.as_str()) {
            continue;
        }
        if values.is_empty() {
            continue;
        }
        if pattern::contains_wildcard_values(values) {
            continue;
        }

        let expr = if values.len() == 1 {
            if let Some((op, rest)) = pattern::extract_operator_prefix(&values[0]) {
                LabelExpression::rewritten(name, op, rest)
            } else {
                LabelExpression::rewritten(name, Operator::RegexMatch, values[0].clone())
            }
        } else {
            LabelExpression::rewritten(name, Operator::RegexMatch, pattern::build_alternation(values))
        };
        tracing::debug!(name = %expr.name, operator = %expr.operator, value = %expr.value, "synthesized missing constraint");
        synthesized.push(expr);
    }
    synthesized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &[&str])]) -> ConstraintMap {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn skips_reserved_keys_and_present_names_and_wildcards() {
        let constraints = map(&[
            ("labels", &["*"]),
            ("namespace", &["demo"]),
            ("pod", &["*"]),
            ("existing", &["value"]),
        ]);
        let present: HashSet<&str> = ["existing"].into_iter().collect();
        let out = synthesize_missing(&constraints, &present);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "namespace");
    }

    #[test]
    fn single_value_uses_regex_match_default() {
        let constraints = map(&[("pod", &["my-pod"])]);
        let out = synthesize_missing(&constraints, &HashSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].operator, Operator::RegexMatch);
        assert_eq!(out[0].value, "my-pod");
    }

    #[test]
    fn single_value_with_operator_prefix_uses_that_operator() {
        let constraints = map(&[("k8s_namespace_name", &["!~^kube-.*"])]);
        let out = synthesize_missing(&constraints, &HashSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].operator, Operator::NotRegexMatch);
        assert_eq!(out[0].value, "^kube-.*");
    }

    #[test]
    fn multiple_values_become_an_alternation() {
        let constraints = map(&[("namespace", &["demo", "prod"])]);
        let out = synthesize_missing(&constraints, &HashSet::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].operator, Operator::RegexMatch);
        assert!(out[0].value == "demo|prod" || out[0].value == "prod|demo");
    }
}
