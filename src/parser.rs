//! Tokenizes the inner content of one label section into an ordered list of
//! [`LabelExpression`]s, generalizing
//! `query_engine.rs::{parse_label_matchers,parse_single_label_matcher}` from
//! the teacher repository.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialect::{Language, PairSeparator, QuerySyntax};
use crate::expression::{LabelExpression, Operator};
use crate::pattern;
use crate::scanner;

/// Matches `<name><comparator><rest>` where `<comparator>` may be a native
/// (non-string) comparator TraceQL intrinsics use alongside the four label
/// operators. Used only to detect the passthrough forms described in
/// `spec.md` §6 (`duration > 0`, `nestedSetParent<0`, `kind = server`,
/// `status = ok`, `... != nil`); it never drives ordinary label parsing.
static NATIVE_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_.]*)\s*(?P<op><=|>=|==|!=|=~|!~|<|>|=)\s*(?P<val>.*)$")
        .expect("static pattern is valid regex")
});

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Parse the inner content of one `{...}`/selector into an ordered list of
/// expressions. Duplicates are preserved; a malformed pair is logged and
/// dropped, never failing the whole section (`spec.md` §4.3, §7).
///
/// Returns `None` when `inner` itself cannot be split at all — oversized,
/// an unclosed quote, or unbalanced braces — which the orchestrator reports
/// as a usage error rather than an (indistinguishable) empty selector.
pub fn parse_section(inner: &str, syntax: &QuerySyntax) -> Option<Vec<LabelExpression>> {
    let repaired = pattern::fix_url_decoding_issues(inner);
    let stripped = strip_wrapping_braces(&repaired, syntax);

    let pairs = match syntax.separator {
        PairSeparator::Char(c) => scanner::try_split_pairs(&stripped, c, true)?,
        PairSeparator::AndAnd => scanner::try_split_traceql_pairs(&stripped)?,
    };

    let mut expressions = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match parse_pair(&pair, syntax) {
            Some(expr) => expressions.push(expr),
            None => {
                tracing::warn!(pair = %pair, "dropping malformed label pair");
            }
        }
    }
    Some(expressions)
}

fn strip_wrapping_braces<'a>(s: &'a str, syntax: &QuerySyntax) -> std::borrow::Cow<'a, str> {
    let trimmed = s.trim();
    if syntax.brace_stripping && trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.len() >= 2
    {
        std::borrow::Cow::Owned(trimmed[1..trimmed.len() - 1].to_string())
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

fn parse_pair(pair: &str, syntax: &QuerySyntax) -> Option<LabelExpression> {
    let trimmed = pair.trim();
    if trimmed.is_empty() {
        return None;
    }

    if syntax.passthrough_keywords.contains(trimmed) {
        return Some(LabelExpression {
            name: String::new(),
            operator: Operator::Equal,
            value: String::new(),
            quoted: false,
            original_text: trimmed.to_string(),
            passthrough: true,
            intrinsic: false,
        });
    }

    if syntax.language == Language::TraceQl {
        if let Some(expr) = try_native_comparison_passthrough(trimmed, syntax) {
            return Some(expr);
        }
    }

    // Reject dangling negation: a pair starting with `!` that is not
    // immediately followed by `=` or `~` is not one of `!=`/`!~` and has
    // no valid operator form.
    if let Some(rest) = trimmed.strip_prefix('!') {
        if !rest.starts_with('=') && !rest.starts_with('~') {
            return None;
        }
    }

    let (op, split_at) = find_operator(trimmed, &syntax.operator_precedence)?;
    let name = trimmed[..split_at].trim();
    let raw_value = trimmed[split_at + op.as_str().len()..].trim();

    let quoted = is_quoted(raw_value);
    let value = if quoted { &raw_value[1..raw_value.len() - 1] } else { raw_value };

    let intrinsic = (syntax.is_intrinsic)(name);
    if !intrinsic && !is_valid_label_name(name) {
        return None;
    }

    let promoted_op = promote_operator_for_regex(op, value);

    Some(LabelExpression {
        name: name.to_string(),
        operator: promoted_op,
        value: value.to_string(),
        quoted,
        original_text: trimmed.to_string(),
        passthrough: false,
        intrinsic,
    })
}

/// Find the first operator (scanning [`Operator::PRECEDENCE`] in order) that
/// occurs in `s` at an index greater than zero (so the name portion is
/// non-empty), returning the operator and its byte offset.
fn find_operator(s: &str, precedence: &[Operator; 4]) -> Option<(Operator, usize)> {
    for op in precedence {
        if let Some(idx) = s.find(op.as_str()) {
            if idx > 0 {
                return Some((*op, idx));
            }
        }
    }
    None
}

fn is_valid_label_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(' ') && !name.contains('"') && !name.contains('\'')
}

/// Regex-operator promotion rule (`spec.md` §4.3 step 7): a value that
/// looks like a regex but was written with `=`/`!=` is rewritten to
/// `=~`/`!~` at parse time, so every downstream stage sees the canonical
/// operator.
fn promote_operator_for_regex(op: Operator, value: &str) -> Operator {
    if pattern::is_regex_pattern(value) {
        match op {
            Operator::Equal => Operator::RegexMatch,
            Operator::NotEqual => Operator::NotRegexMatch,
            other => other,
        }
    } else {
        op
    }
}

/// Detect the TraceQL "native comparator" and "`!= nil`" passthrough forms
/// described in `spec.md` §6. Returns `None` when the pair is an ordinary
/// quoted string comparison that the ordinary path should handle instead
/// (this is what lets a constraint defined for an intrinsic name still
/// enforce a quoted-string comparison against it).
fn try_native_comparison_passthrough(trimmed: &str, syntax: &QuerySyntax) -> Option<LabelExpression> {
    let caps = NATIVE_COMPARISON.captures(trimmed)?;
    let name = caps.name("name")?.as_str();
    let op = caps.name("op")?.as_str();
    let val = caps.name("val")?.as_str().trim();

    let is_string_operator = Operator::from_str(op).is_some();
    if is_string_operator && is_quoted(val) {
        // Ordinary enforceable label expression; let the normal path parse it.
        return None;
    }

    if op == "!=" && val == "nil" {
        return Some(passthrough_intrinsic(trimmed, name, syntax));
    }

    if (syntax.is_intrinsic)(name) {
        return Some(passthrough_intrinsic(trimmed, name, syntax));
    }

    None
}

fn passthrough_intrinsic(original_text: &str, name: &str, syntax: &QuerySyntax) -> LabelExpression {
    LabelExpression {
        name: name.to_string(),
        operator: Operator::Equal,
        value: String::new(),
        quoted: false,
        original_text: original_text.to_string(),
        passthrough: true,
        intrinsic: (syntax.is_intrinsic)(name),
    }
}
