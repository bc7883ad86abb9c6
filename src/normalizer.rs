//! Canonicalizes wildcard/empty label values into regex-operator form
//! before enforcement runs (`spec.md` §4.4). Purely syntactic: the only
//! constraint-map fact this stage consults is "is there exactly one
//! allowed value", to collapse an empty `=` comparison straight to it.

use crate::expression::{LabelExpression, Operator};
use crate::pattern;

/// Normalize one expression. `av` is the constraint-map entry for this
/// expression's name, if any.
pub fn normalize(expr: &LabelExpression, av: Option<&[String]>) -> LabelExpression {
    if expr.passthrough || expr.intrinsic || pattern::RESERVED_KEYS.contains(&expr.name.as_str()) {
        return expr.clone();
    }
    if expr.operator == Operator::NotRegexMatch {
        return expr.clone();
    }

    let is_wildcard = pattern::is_wildcard_pattern(&expr.value);
    let is_empty = expr.value.is_empty();

    if !is_empty && !is_wildcard {
        return expr.clone();
    }

    if is_empty {
        match expr.operator {
            Operator::Equal => match av {
                Some(values) if values.len() == 1 => {
                    LabelExpression::rewritten(&expr.name, Operator::Equal, values[0].clone())
                }
                _ => LabelExpression::rewritten(&expr.name, Operator::RegexMatch, ".+"),
            },
            // `container!=""` idiom: preserve as-is.
            Operator::NotEqual => expr.clone(),
            // `=~` with an empty value has no documented special case; leave unchanged.
            Operator::RegexMatch => expr.clone(),
            Operator::NotRegexMatch => unreachable!("filtered above"),
        }
    } else {
        LabelExpression::rewritten(&expr.name, Operator::RegexMatch, ".*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(name: &str, op: Operator, value: &str) -> LabelExpression {
        LabelExpression {
            name: name.to_string(),
            operator: op,
            value: value.to_string(),
            quoted: true,
            original_text: format!("{name}{op}\"{value}\""),
            passthrough: false,
            intrinsic: false,
        }
    }

    #[test]
    fn empty_equals_with_single_allowed_value_collapses_to_it() {
        let e = expr("namespace", Operator::Equal, "");
        let av = vec!["prod".to_string()];
        let out = normalize(&e, Some(&av));
        assert_eq!(out.operator, Operator::Equal);
        assert_eq!(out.value, "prod");
    }

    #[test]
    fn empty_equals_with_multiple_or_no_allowed_values_becomes_dot_plus() {
        let e = expr("namespace", Operator::Equal, "");
        let av = vec!["prod".to_string(), "demo".to_string()];
        let out = normalize(&e, Some(&av));
        assert_eq!(out.operator, Operator::RegexMatch);
        assert_eq!(out.value, ".+");

        let out_no_av = normalize(&e, None);
        assert_eq!(out_no_av.operator, Operator::RegexMatch);
        assert_eq!(out_no_av.value, ".+");
    }

    #[test]
    fn empty_not_equals_is_preserved() {
        let e = expr("container", Operator::NotEqual, "");
        let out = normalize(&e, None);
        assert_eq!(out.operator, Operator::NotEqual);
        assert_eq!(out.value, "");
    }

    #[test]
    fn wildcard_value_becomes_regex_match_dot_star() {
        for op in [Operator::Equal, Operator::NotEqual, Operator::RegexMatch] {
            let e = expr("service", op, "*");
            let out = normalize(&e, None);
            assert_eq!(out.operator, Operator::RegexMatch);
            assert_eq!(out.value, ".*");
        }
    }

    #[test]
    fn not_regex_match_is_never_touched() {
        let e = expr("namespace", Operator::NotRegexMatch, "observability");
        let out = normalize(&e, None);
        assert_eq!(out, e);
    }

    #[test]
    fn passthrough_and_intrinsic_are_untouched() {
        let mut e = expr("status", Operator::Equal, "");
        e.intrinsic = true;
        assert_eq!(normalize(&e, None), e);

        let mut p = expr("", Operator::Equal, "");
        p.passthrough = true;
        assert_eq!(normalize(&p, None), p);
    }
}
