//! The authorization core: per-operator enforcement against a constraint
//! map (`spec.md` §4.5). This is the only stage that can raise
//! [`EnhanceError::Unauthorized`].

use crate::error::EnhanceError;
use crate::expression::{LabelExpression, Operator};
use crate::pattern;

/// True iff `av` is present and not a wildcard/glob-star constraint set.
/// Unlike the textual definition in `spec.md` §4.5 ("AV is non-empty and
/// not wildcard-constraints"), an explicitly-empty-but-present `av` still
/// counts: per the external-interface contract in `spec.md` §6 ("empty
/// means 'no value allowed'") and the Open Question resolution in
/// `DESIGN.md`, only a wholly *absent* constraint (`av` is `None`) means
/// "no constraint"; a present-but-empty one means "deny everything".
fn specific_constraints(av: Option<&[String]>) -> bool {
    match av {
        None => false,
        Some(values) => !pattern::contains_wildcard_or_glob(values),
    }
}

fn wildcard_constraints(av: Option<&[String]>) -> bool {
    av.map(pattern::contains_wildcard_or_glob).unwrap_or(false)
}

fn expand_via_av(name: &str, av: Option<&[String]>) -> LabelExpression {
    match av {
        Some(values) if !values.is_empty() => {
            LabelExpression::rewritten(name, Operator::RegexMatch, pattern::build_alternation(values))
        }
        _ => LabelExpression::rewritten(name, Operator::RegexMatch, ".*"),
    }
}

/// Build the final expression from a non-empty set of surviving values,
/// collapsing to `=` when exactly one survives — unless that one value
/// carries an operator-prefix encoding (`spec.md` §4.5: operator-prefix
/// extraction applies "whenever a constraint expression is built from a
/// single AV element", not only during synthesis in §4.6), in which case
/// the prefix's operator and remainder are used verbatim; or is itself a
/// wildcard pattern, in which case it becomes `=~` with the wildcard
/// converted to regex form (`spec.md` §4.5, final paragraph).
fn collapse_or_alternate(name: &str, values: &[String]) -> LabelExpression {
    let expr = if values.len() == 1 {
        let only = &values[0];
        if let Some((op, rest)) = pattern::extract_operator_prefix(only) {
            LabelExpression::rewritten(name, op, rest)
        } else if pattern::is_wildcard_pattern(only) {
            LabelExpression::rewritten(name, Operator::RegexMatch, pattern::convert_wildcard_to_regex(only))
        } else {
            LabelExpression::rewritten(name, Operator::Equal, only.clone())
        }
    } else {
        LabelExpression::rewritten(name, Operator::RegexMatch, pattern::build_alternation(values))
    };
    tracing::debug!(name = %expr.name, operator = %expr.operator, value = %expr.value, "narrowed expression against allowed values");
    expr
}

/// Enforce one expression. Returns `Ok(Some(expr))` to keep (possibly
/// rewritten) the expression, `Ok(None)` to drop it silently (the `!~`
/// empty-constraint case), or `Err(Unauthorized/EnhancementFailure)`.
pub fn enhance(expr: &LabelExpression, av: Option<&[String]>) -> Result<Option<LabelExpression>, EnhanceError> {
    if expr.passthrough {
        return Ok(Some(expr.clone()));
    }

    let value_is_wildcard = pattern::is_empty_or_wildcard(&expr.value);

    match expr.operator {
        Operator::Equal => enhance_equal(expr, av, value_is_wildcard),
        Operator::NotEqual => enhance_not_equal(expr, av, value_is_wildcard),
        Operator::RegexMatch => enhance_regex_match(expr, av, value_is_wildcard),
        Operator::NotRegexMatch => enhance_not_regex_match(expr, av),
    }
}

fn enhance_equal(
    expr: &LabelExpression,
    av: Option<&[String]>,
    value_is_wildcard: bool,
) -> Result<Option<LabelExpression>, EnhanceError> {
    if value_is_wildcard {
        return Ok(Some(expand_via_av(&expr.name, av)));
    }
    let Some(values) = av else {
        return Ok(Some(expr.clone()));
    };
    if wildcard_constraints(Some(values)) {
        return Ok(Some(expr.clone()));
    }
    if values.iter().any(|v| v == &expr.value) {
        return Ok(Some(expr.clone()));
    }
    for v in values {
        if pattern::is_full_regex_pattern(v) && pattern::regex_full_match(v, &expr.value)? {
            return Ok(Some(expr.clone()));
        }
    }
    Err(EnhanceError::unauthorized(&expr.value))
}

fn enhance_not_equal(
    expr: &LabelExpression,
    av: Option<&[String]>,
    value_is_wildcard: bool,
) -> Result<Option<LabelExpression>, EnhanceError> {
    if expr.value.is_empty() {
        return Ok(Some(expr.clone()));
    }
    if value_is_wildcard {
        return Ok(Some(expand_via_av(&expr.name, av)));
    }
    if specific_constraints(av) {
        let values = av.expect("specific_constraints implies Some");
        let remaining: Vec<String> = values.iter().filter(|v| *v != &expr.value).cloned().collect();
        if remaining.is_empty() {
            return Err(EnhanceError::unauthorized(&expr.value));
        }
        return Ok(Some(collapse_or_alternate(&expr.name, &remaining)));
    }
    Ok(Some(expr.clone()))
}

fn enhance_regex_match(
    expr: &LabelExpression,
    av: Option<&[String]>,
    value_is_wildcard: bool,
) -> Result<Option<LabelExpression>, EnhanceError> {
    if value_is_wildcard {
        return Ok(Some(expand_via_av(&expr.name, av)));
    }
    if specific_constraints(av) {
        let values = av.expect("specific_constraints implies Some");
        let mut matching = Vec::new();
        for v in values {
            if pattern::regex_full_match(&expr.value, v)? {
                matching.push(v.clone());
            }
        }
        if matching.is_empty() {
            return Err(EnhanceError::unauthorized(&expr.value));
        }
        return Ok(Some(collapse_or_alternate(&expr.name, &matching)));
    }
    Ok(Some(LabelExpression::rewritten(&expr.name, Operator::RegexMatch, expr.value.clone())))
}

fn enhance_not_regex_match(
    expr: &LabelExpression,
    av: Option<&[String]>,
) -> Result<Option<LabelExpression>, EnhanceError> {
    let Some(values) = av else {
        return Ok(Some(LabelExpression::rewritten(
            &expr.name,
            Operator::NotRegexMatch,
            expr.value.clone(),
        )));
    };
    if values.is_empty() {
        return Ok(None);
    }
    if specific_constraints(Some(values)) {
        let mut remaining = Vec::new();
        for v in values {
            if !pattern::regex_full_match(&expr.value, v)? {
                remaining.push(v.clone());
            }
        }
        if remaining.is_empty() {
            return Err(EnhanceError::unauthorized(&expr.value));
        }
        return Ok(Some(collapse_or_alternate(&expr.name, &remaining)));
    }
    Ok(Some(LabelExpression::rewritten(&expr.name, Operator::NotRegexMatch, expr.value.clone())))
}
