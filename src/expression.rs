//! The atomic data types the pipeline passes from stage to stage.

/// One of the four label-selector operators. Parsing always produces one of
/// these four; an unrecognized operator is a parse-time error, never a
/// runtime dispatch miss (REDESIGN FLAG: tagged variant, not a closure
/// table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    RegexMatch,
    /// `!~`
    NotRegexMatch,
}

impl Operator {
    /// Parse one of the four operator symbols. Returns `None` for anything
    /// else — callers that need a hard error should map that themselves.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "!~" => Some(Self::NotRegexMatch),
            "=~" => Some(Self::RegexMatch),
            "!=" => Some(Self::NotEqual),
            "=" => Some(Self::Equal),
            _ => None,
        }
    }

    /// Render back to its selector-syntax symbol.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::RegexMatch => "=~",
            Self::NotRegexMatch => "!~",
        }
    }

    /// The dialect-independent operator precedence list, longest-first, so
    /// that two-character operators are matched before their one-character
    /// prefixes (`!=` before... there is no shorter prefix of `!=`, but
    /// `=~`/`!~` must both be tried before bare `=`).
    pub const PRECEDENCE: [Self; 4] =
        [Self::NotRegexMatch, Self::RegexMatch, Self::NotEqual, Self::Equal];
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `name op value` unit parsed out of a selector, or a passthrough
/// fragment preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelExpression {
    /// Label name. Non-empty, no whitespace or quotes, unless `passthrough`.
    pub name: String,
    /// The operator. Meaningless (but present) when `passthrough` is set.
    pub operator: Operator,
    /// The value, unquoted. May be empty. Meaningless when `passthrough`.
    pub value: String,
    /// Whether the value was wrapped in `"..."` in the source text.
    pub quoted: bool,
    /// The exact substring this expression was parsed from, used to
    /// preserve original spacing/casing when the expression is emitted
    /// unchanged. Authoritative for any expression the pipeline did not
    /// rewrite (REDESIGN FLAG: no separate "reconstruct" branch drifting
    /// out of sync with this field).
    pub original_text: String,
    /// True for dialect intrinsics and keyword literals (`true`, `false`,
    /// `duration > 0`): preserved verbatim, never enforced.
    pub passthrough: bool,
    /// True when `name` is a dialect-reserved attribute (`status`,
    /// `duration`, `kind`, `name`, `nestedSetParent`, ...): name validation
    /// and enforcement are both bypassed.
    pub intrinsic: bool,
}

impl LabelExpression {
    /// Build a non-passthrough, non-intrinsic expression with no
    /// meaningful `original_text` (used when a stage rewrites or
    /// synthesizes a new expression; such expressions are always
    /// reserialized rather than emitted verbatim).
    pub fn rewritten(name: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator,
            value: value.into(),
            quoted: true,
            original_text: String::new(),
            passthrough: false,
            intrinsic: false,
        }
    }

    /// True if this expression was rewritten by a pipeline stage and must
    /// be reserialized rather than emitted via `original_text`.
    pub fn was_rewritten(&self) -> bool {
        self.original_text.is_empty() && !self.passthrough
    }
}

/// A contiguous `{ ... }` region of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSection {
    /// Byte offset of the opening `{` in the original query.
    pub start: usize,
    /// Byte offset one past the closing `}` in the original query.
    pub end: usize,
    /// The inner content, not including the braces.
    pub inner: String,
}
