//! Parse stage: raw text to [`ParsedExpression`].

use tracing::debug;

use crate::model::{ParsedExpression, RawAnswer};
use crate::normalize::normalize;
use crate::traits::SymbolicSubstrate;

/// Normalize and parse an answer. A parse failure yields an invalid
/// expression rather than an error.
pub fn parse_expression<S: SymbolicSubstrate>(
    substrate: &S,
    answer: &RawAnswer,
) -> ParsedExpression<S::Expr> {
    let normalized = normalize(&answer.text);
    let tree = match substrate.parse(&normalized) {
        Ok(tree) => Some(tree),
        Err(e) => {
            debug!(role = %answer.role, input = %answer.text, normalized = %normalized, "parse failed: {e}");
            None
        }
    };
    ParsedExpression {
        source_text: answer.text.clone(),
        normalized,
        tree,
    }
}
