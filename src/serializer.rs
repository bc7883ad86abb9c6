//! Joins a section's enhanced expressions back into selector text
//! (`spec.md` §4.7). "Original text is authoritative": an expression that
//! was never rewritten is emitted verbatim, preserving its exact spacing;
//! only rewritten or synthesized expressions are reconstructed.

use crate::dialect::QuerySyntax;
use crate::expression::LabelExpression;

/// Render one expression back to selector text.
fn render_expression(expr: &LabelExpression) -> String {
    if !expr.was_rewritten() {
        return expr.original_text.clone();
    }
    format!("{}{}\"{}\"", expr.name, expr.operator, expr.value)
}

/// Join `exprs` using `syntax`'s render separator, in the order given.
/// Callers are responsible for ordering (parsed expressions first, then
/// any synthesized ones appended) before calling this.
pub fn serialize_section(exprs: &[LabelExpression], syntax: &QuerySyntax) -> String {
    exprs
        .iter()
        .map(render_expression)
        .collect::<Vec<_>>()
        .join(syntax.render_separator)
}
