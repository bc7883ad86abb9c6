//! Quote/brace-aware splitting of selector text, generalized from the
//! comma-splitter in `query_engine.rs::split_label_expressions` of the
//! teacher repository into a dialect-parametrized pair splitter plus a
//! top-level brace locator.

use crate::expression::LabelSection;

/// Hard input-size bound, matching the reference implementation's 10,000
/// character cap (`spec.md` §4.2, §5, §8).
pub const MAX_INPUT_LEN: usize = 10_000;

/// Split `s` on `separator` at brace-depth 0, honoring single/double-quoted
/// spans (a `\"` inside `"..."` does not close the quote) and, if
/// `brace_aware`, nested `{...}` spans.
///
/// Returns an empty vector if `s` exceeds [`MAX_INPUT_LEN`], has an unclosed
/// quote, an unmatched `}`, or an unclosed `{`. Callers that need to tell a
/// malformed input apart from a legitimately empty one should use
/// [`try_split_pairs`] instead.
pub fn split_pairs(s: &str, separator: char, brace_aware: bool) -> Vec<String> {
    try_split_pairs(s, separator, brace_aware).unwrap_or_default()
}

/// As [`split_pairs`], but returns `None` when `s` is malformed (oversized,
/// an unclosed quote, an unmatched `}`, or an unclosed `{`) rather than
/// collapsing that case to an empty vector. The orchestrator uses this
/// distinction to raise a usage error instead of silently treating a
/// malformed selector as an empty one (`spec.md` §8 boundary: "Unclosed
/// quote in a selector ⇒ section parse yields empty list; orchestrator
/// emits a usage error").
pub fn try_split_pairs(s: &str, separator: char, brace_aware: bool) -> Option<Vec<String>> {
    if s.len() > MAX_INPUT_LEN {
        return None;
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut brace_depth: i32 = 0;

    for ch in s.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if quote.is_some() => {
                escape_next = true;
                current.push(ch);
            }
            '"' | '\'' => {
                match quote {
                    Some(q) if q == ch => quote = None,
                    Some(_) => {}
                    None => quote = Some(ch),
                }
                current.push(ch);
            }
            '{' if brace_aware && quote.is_none() => {
                brace_depth += 1;
                current.push(ch);
            }
            '}' if brace_aware && quote.is_none() => {
                if brace_depth == 0 {
                    return None;
                }
                brace_depth -= 1;
                current.push(ch);
            }
            c if c == separator && quote.is_none() && brace_depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() || brace_depth != 0 {
        return None;
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    Some(parts)
}

/// Split `s` on the literal two-character token `&&` at depth 0, regardless
/// of surrounding whitespace (`a&&b`, `a && b`, `a&&  b` all split
/// equivalently). Quoted `&&` is honored; the same failure conditions as
/// [`split_pairs`] apply.
pub fn split_traceql_pairs(s: &str) -> Vec<String> {
    try_split_traceql_pairs(s).unwrap_or_default()
}

/// As [`split_traceql_pairs`], but returns `None` on malformed input (see
/// [`try_split_pairs`]).
pub fn try_split_traceql_pairs(s: &str) -> Option<Vec<String>> {
    if s.len() > MAX_INPUT_LEN {
        return None;
    }

    let chars: Vec<char> = s.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if escape_next {
            current.push(ch);
            escape_next = false;
            i += 1;
            continue;
        }

        match ch {
            '\\' if quote.is_some() => {
                escape_next = true;
                current.push(ch);
                i += 1;
            }
            '"' | '\'' => {
                match quote {
                    Some(q) if q == ch => quote = None,
                    Some(_) => {}
                    None => quote = Some(ch),
                }
                current.push(ch);
                i += 1;
            }
            '&' if quote.is_none() && chars.get(i + 1) == Some(&'&') => {
                parts.push(current.trim().to_string());
                current.clear();
                i += 2;
            }
            _ => {
                current.push(ch);
                i += 1;
            }
        }
    }

    if quote.is_some() {
        return None;
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    Some(parts)
}

/// True iff `s` contains a bare top-level `||` (disjunction), not inside a
/// quoted span. TraceQL disjunction is not supported; detecting it here
/// lets the orchestrator reject it per the resolved Open Question in
/// `DESIGN.md`.
pub fn contains_top_level_disjunction(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if escape_next {
            escape_next = false;
            i += 1;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => {
                escape_next = true;
                i += 1;
            }
            '"' | '\'' => {
                match quote {
                    Some(q) if q == ch => quote = None,
                    Some(_) => {}
                    None => quote = Some(ch),
                }
                i += 1;
            }
            '|' if quote.is_none() && chars.get(i + 1) == Some(&'|') => return true,
            _ => i += 1,
        }
    }
    false
}

/// Locate every top-level `{...}` region in `query`, ignoring braces that
/// appear inside a quoted string. Sections do not nest in the inputs this
/// core handles, so the first unmatched `{` at depth 0 starts a section and
/// the matching `}` (back to depth 0) ends it.
pub fn find_label_sections(query: &str) -> Vec<LabelSection> {
    let mut sections = Vec::new();
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut depth: i32 = 0;
    let mut current_start: Option<usize> = None;

    for (idx, ch) in query.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape_next = true,
            '"' | '\'' => match quote {
                Some(q) if q == ch => quote = None,
                Some(_) => {}
                None => quote = Some(ch),
            },
            '{' if quote.is_none() => {
                if depth == 0 {
                    current_start = Some(idx);
                }
                depth += 1;
            }
            '}' if quote.is_none() => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(start) = current_start.take() {
                            let end = idx + ch.len_utf8();
                            let inner = query[start + 1..idx].to_string();
                            sections.push(LabelSection { start, end, inner });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    sections
}

/// True iff `query` has an unclosed quote or an unclosed top-level `{` by
/// the time input ends — a shape [`find_label_sections`] can't surface on
/// its own, since an unterminated quote simply prevents the enclosing
/// section from ever closing rather than raising anything. The orchestrator
/// uses this to tell "malformed input" apart from "no selector present"
/// (`spec.md` §8 boundary).
pub fn has_unbalanced_quote_or_brace(query: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut escape_next = false;
    let mut depth: i32 = 0;

    for ch in query.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape_next = true,
            '"' | '\'' => match quote {
                Some(q) if q == ch => quote = None,
                Some(_) => {}
                None => quote = Some(ch),
            },
            '{' if quote.is_none() => depth += 1,
            '}' if quote.is_none() => depth -= 1,
            _ => {}
        }
    }

    quote.is_some() || depth != 0
}

/// Apply `f` to each top-level section's inner content and splice the
/// results back into `query` in place, right to left so earlier offsets
/// stay valid.
pub fn replace_label_sections(query: &str, mut f: impl FnMut(&str) -> String) -> String {
    let sections = find_label_sections(query);
    let mut out = query.to_string();
    for section in sections.into_iter().rev() {
        let replacement = f(&section.inner);
        out.replace_range(section.start + 1..section.end - 1, &replacement);
    }
    out
}

/// Apply `f` to only the first top-level section's inner content.
pub fn replace_first_label_section(query: &str, f: impl FnOnce(&str) -> String) -> String {
    let sections = find_label_sections(query);
    if let Some(section) = sections.into_iter().next() {
        let replacement = f(&section.inner);
        let mut out = query.to_string();
        out.replace_range(section.start + 1..section.end - 1, &replacement);
        return out;
    }
    query.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pairs_handles_quotes_and_commas() {
        let parts = split_pairs(r#"a="b",c!="d",e=~"regex""#, ',', false);
        assert_eq!(parts, vec![r#"a="b""#, r#"c!="d""#, r#"e=~"regex""#]);
    }

    #[test]
    fn split_pairs_honors_escaped_quotes() {
        let parts = split_pairs(r#"a="value with \"quotes\"",b="normal""#, ',', false);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], r#"a="value with \"quotes\"""#);
    }

    #[test]
    fn split_pairs_preserves_commas_inside_quotes() {
        let parts = split_pairs(r#"description="contains, comma",job="api""#, ',', false);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn split_pairs_rejects_unclosed_quote() {
        assert!(split_pairs(r#"a="unterminated"#, ',', false).is_empty());
    }

    #[test]
    fn split_pairs_rejects_input_over_bound() {
        let huge = "a".repeat(MAX_INPUT_LEN + 1);
        assert!(split_pairs(&huge, ',', false).is_empty());
    }

    #[test]
    fn split_traceql_pairs_ignores_surrounding_whitespace() {
        assert_eq!(split_traceql_pairs("a&&b"), vec!["a", "b"]);
        assert_eq!(split_traceql_pairs("a && b"), vec!["a", "b"]);
        assert_eq!(split_traceql_pairs("a&&  b"), vec!["a", "b"]);
    }

    #[test]
    fn split_traceql_pairs_honors_quoting() {
        let parts = split_traceql_pairs(r#"name="a&&b" && other="c""#);
        assert_eq!(parts, vec![r#"name="a&&b""#, r#"other="c""#]);
    }

    #[test]
    fn disjunction_detection_ignores_quoted_pipes() {
        assert!(!contains_top_level_disjunction(r#"name="a||b""#));
        assert!(contains_top_level_disjunction(r#"name="a" || name="b""#));
    }

    #[test]
    fn unbalanced_quote_or_brace_flags_unterminated_input() {
        assert!(has_unbalanced_quote_or_brace(r#"metric{a="unterminated}"#));
        assert!(has_unbalanced_quote_or_brace(r#"metric{a="value""#));
        assert!(!has_unbalanced_quote_or_brace(r#"metric{a="value"}"#));
    }

    #[test]
    fn find_label_sections_ignores_braces_in_quotes() {
        let sections = find_label_sections(r#"metric{a="{not a brace}"}"#);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].inner, r#"a="{not a brace}""#);
    }

    #[test]
    fn find_label_sections_locates_multiple_top_level_sections() {
        let sections = find_label_sections(r#"{a="1"} and {b="2"}"#);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].inner, r#"a="1""#);
        assert_eq!(sections[1].inner, r#"b="2""#);
    }

    #[test]
    fn replace_label_sections_splices_in_place() {
        let out = replace_label_sections(r#"metric{a="1"}"#, |inner| {
            assert_eq!(inner, r#"a="1""#);
            r#"a="1",b="2""#.to_string()
        });
        assert_eq!(out, r#"metric{a="1",b="2"}"#);
    }
}
