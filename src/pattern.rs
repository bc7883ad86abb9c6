//! Pure classification and rewriting helpers for label-selector values.
//!
//! These functions never allocate beyond what producing their return value
//! requires, and never consult a constraint map: they answer "what shape is
//! this string" questions only. Higher stages (`normalizer`, `enhancer`)
//! decide what to do with the answer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::EnhanceError;

/// The four values policy authors use to mean "match anything".
const WILDCARD_PATTERNS: &[&str] = &["*", ".*", ".+", "()"];

/// Constraint-map keys that carry meta-policy rather than a label constraint.
///
/// The collaborator that owns the persisted mapping may define additional
/// reserved keys; the core only ships the two documented in `spec.md` §3.
pub const RESERVED_KEYS: &[&str] = &["labels", "groups"];

/// Prefixes recognized on a constraint-map value to select a non-default
/// operator when synthesizing an expression from it. Order matters: longer
/// prefixes must be tried before their own prefixes (`!~` before `!=`).
pub const OPERATOR_PREFIXES: &[&str] = &["!~", "=~", "!="];

static REGEX_METACHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\^$\[\]()|\\]").expect("static pattern is valid regex"));

/// True iff `v` is one of the four canonical wildcard forms.
pub fn is_wildcard_pattern(v: &str) -> bool {
    WILDCARD_PATTERNS.contains(&v)
}

/// True iff any element of `set` is a canonical wildcard form.
pub fn contains_wildcard_values(set: &[String]) -> bool {
    set.iter().any(|v| is_wildcard_pattern(v))
}

/// True iff `v` is empty/absent or a canonical wildcard form.
pub fn is_empty_or_wildcard(v: &str) -> bool {
    v.is_empty() || is_wildcard_pattern(v)
}

/// True iff `v` looks like a regex rather than a literal value or a plain
/// `*`-glob. A value whose only metacharacter is `*` is a glob, not a regex:
/// it is handled by [`is_glob_star`] instead.
pub fn is_regex_pattern(v: &str) -> bool {
    if is_wildcard_pattern(v) {
        return false;
    }
    if REGEX_METACHAR.is_match(v) {
        return true;
    }
    v.contains(".*") || v.contains(".+")
}

/// True iff `v` carries an anchor, character class, alternation, group, or
/// escape — i.e. it is unambiguously a regular expression rather than a
/// glob or literal. Used where the spec calls for matching against "a full
/// regex", as opposed to the looser [`is_regex_pattern`].
pub fn is_full_regex_pattern(v: &str) -> bool {
    if is_wildcard_pattern(v) {
        return false;
    }
    v.contains('^')
        || v.contains('$')
        || v.contains('[')
        || v.contains(']')
        || v.contains('(')
        || v.contains(')')
        || v.contains('|')
        || v.contains('\\')
}

/// True iff `v`'s only metacharacter is a glob `*` (not a canonical wildcard
/// pattern, not a full regex). Such values are globs like `prod-*`.
pub fn is_glob_star(v: &str) -> bool {
    !is_wildcard_pattern(v) && v.contains('*') && !is_full_regex_pattern(v)
}

/// True iff `set` contains a canonical wildcard pattern or a `*`-glob,
/// meaning the policy author intended "no enforcement needed" for this
/// label. Broader than [`contains_wildcard_values`], which the synthesizer
/// uses for its narrower skip condition.
pub fn contains_wildcard_or_glob(set: &[String]) -> bool {
    set.iter().any(|v| is_wildcard_pattern(v) || is_glob_star(v))
}

/// Replace every `*` in `v` with `.*`; all other characters pass through
/// untouched. Used to turn a glob into an equivalent regex fragment.
pub fn convert_wildcard_to_regex(v: &str) -> String {
    v.replace('*', ".*")
}

/// Repair a small, explicitly-enumerated set of artifacts left behind by a
/// naive URL-decode of a label-selector blob, before the scanner and parser
/// ever see it.
///
/// Two repairs are applied, in order:
/// 1. A literal `+` immediately inside an already-open double-quoted value
///    is restored to a space (a common URL-decoding artifact: `+` decodes
///    to itself rather than to the space it replaced in `application/
///    x-www-form-urlencoded` bodies).
/// 2. A doubled percent-escape `%2522` that a single decode pass turns into
///    a literal `%22` (rather than the intended `"`) is decoded a second
///    time, since a stray literal `%22` inside a value would otherwise be
///    treated as ordinary text and break quote balancing downstream.
///
/// This is additive-only: a well-formed blob is returned unchanged.
pub fn fix_url_decoding_issues(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    let mut in_quote = false;
    let mut chars = v.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quote = !in_quote;
                out.push(c);
            }
            '+' if in_quote => out.push(' '),
            _ => out.push(c),
        }
    }
    out.replace("%22", "\"")
}

/// Scan `v` against [`OPERATOR_PREFIXES`] (longest-first) and split off the
/// matching prefix as an [`Operator`](crate::expression::Operator).
///
/// Returns `None` if `v` starts with none of the recognized prefixes, in
/// which case the caller should treat `v` as a plain value with no operator
/// override.
pub fn extract_operator_prefix(v: &str) -> Option<(crate::expression::Operator, &str)> {
    for prefix in OPERATOR_PREFIXES {
        if let Some(rest) = v.strip_prefix(prefix) {
            let op = crate::expression::Operator::from_str(prefix)
                .expect("OPERATOR_PREFIXES entries are valid operator symbols");
            return Some((op, rest));
        }
    }
    None
}

/// Full-string anchored regex match of `candidate` against `pattern`.
///
/// Per the resolved Open Question in `DESIGN.md`, a malformed `pattern` is
/// rejected rather than silently falling back to substring containment:
/// that fallback is unsafe for an authorization decision.
pub fn regex_full_match(pattern: &str, candidate: &str) -> Result<bool, EnhanceError> {
    let anchored = format!("^(?:{pattern})$");
    let re = Regex::new(&anchored)
        .map_err(|e| EnhanceError::EnhancementFailure(format!("invalid regex {pattern:?}: {e}")))?;
    Ok(re.is_match(candidate))
}

/// Join deduplicated, non-empty values with `|`, preserving first-seen
/// order. Regex-valued elements are included verbatim (metacharacters are
/// never escaped); literal elements are also included verbatim, per the
/// alternation-building rule in `spec.md` §4.5.
pub fn build_alternation(values: &[String]) -> String {
    let mut seen = std::collections::HashSet::new();
    let mut parts = Vec::new();
    for v in values {
        if v.is_empty() {
            continue;
        }
        if seen.insert(v.as_str()) {
            parts.push(v.as_str());
        }
    }
    parts.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_recognizes_canonical_forms() {
        for w in WILDCARD_PATTERNS {
            assert!(is_wildcard_pattern(w));
        }
        assert!(!is_wildcard_pattern("prod"));
        assert!(!is_wildcard_pattern(""));
    }

    #[test]
    fn empty_or_wildcard_covers_empty_string() {
        assert!(is_empty_or_wildcard(""));
        assert!(is_empty_or_wildcard("*"));
        assert!(!is_empty_or_wildcard("prod"));
    }

    #[test]
    fn regex_pattern_excludes_pure_wildcards_and_star_globs() {
        assert!(!is_regex_pattern("*"));
        assert!(!is_regex_pattern(".*"));
        assert!(!is_regex_pattern("prod-*"));
        assert!(is_regex_pattern("^prod.*$"));
        assert!(is_regex_pattern("a|b"));
        assert!(is_regex_pattern(r"kube\-.*"));
    }

    #[test]
    fn full_regex_pattern_requires_a_real_regex_feature() {
        assert!(!is_full_regex_pattern("prod-*"));
        assert!(is_full_regex_pattern("^kube-.*"));
        assert!(is_full_regex_pattern("(a|b)"));
    }

    #[test]
    fn glob_star_is_its_own_category() {
        assert!(is_glob_star("prod-*"));
        assert!(!is_glob_star("*"));
        assert!(!is_glob_star("^prod-.*$"));
    }

    #[test]
    fn contains_wildcard_or_glob_is_broader_than_contains_wildcard_values() {
        let globs = vec!["prod-*".to_string()];
        assert!(!contains_wildcard_values(&globs));
        assert!(contains_wildcard_or_glob(&globs));
    }

    #[test]
    fn convert_wildcard_to_regex_only_touches_asterisks() {
        assert_eq!(convert_wildcard_to_regex("*"), ".*");
        assert_eq!(convert_wildcard_to_regex("prod-*"), "prod-.*");
        assert_eq!(convert_wildcard_to_regex("literal"), "literal");
    }

    #[test]
    fn fix_url_decoding_restores_space_inside_quotes_only() {
        assert_eq!(fix_url_decoding_issues(r#""a+b""#), r#""a b""#);
        assert_eq!(fix_url_decoding_issues("a+b"), "a+b");
    }

    #[test]
    fn fix_url_decoding_undoes_doubled_percent_escape() {
        assert_eq!(fix_url_decoding_issues("value%2522here"), r#"value"here"#);
    }

    #[test]
    fn operator_prefix_extraction_prefers_longest_match() {
        let (op, rest) = extract_operator_prefix("!~^kube-.*").expect("prefix present");
        assert_eq!(op.as_str(), "!~");
        assert_eq!(rest, "^kube-.*");

        let (op, rest) = extract_operator_prefix("!=denied").expect("prefix present");
        assert_eq!(op.as_str(), "!=");
        assert_eq!(rest, "denied");

        assert!(extract_operator_prefix("plain-value").is_none());
    }

    #[test]
    fn regex_full_match_is_anchored() {
        assert!(regex_full_match("demo|prod", "demo").expect("valid regex"));
        assert!(!regex_full_match("demo|prod", "demodata").expect("valid regex"));
    }

    #[test]
    fn regex_full_match_rejects_malformed_pattern() {
        let err = regex_full_match("(unclosed", "x").expect_err("malformed regex");
        assert!(matches!(err, EnhanceError::EnhancementFailure(_)));
    }

    #[test]
    fn build_alternation_dedupes_and_preserves_order() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string(), "".to_string()];
        assert_eq!(build_alternation(&values), "b|a");
    }
}
