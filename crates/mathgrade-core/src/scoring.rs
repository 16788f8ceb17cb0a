//! Partial-credit scorer.
//!
//! Tiers are tried top-down and the first that applies sets the score:
//!
//! 1. equivalent at the loose tolerance: 0.95
//! 2. the first classified kind found in [`CLASSIFICATION_TIERS`]
//! 3. both sides constant and the reference nonzero: one minus the
//!    relative error, floored at 0
//! 4. identical printed forms: 0.90. Never reached in practice, since
//!    [`equivalent`] accepts identical printed forms and tier 1 fires
//!    first. It stays in its place in the order.
//! 5. Jaccard similarity of the printed forms' token sets, or 0.3 when
//!    either has no tokens
//!
//! A substrate failure at any tier scores 0.2.

use std::collections::BTreeSet;

use tracing::debug;

use crate::equivalence::equivalent;
use crate::error::SubstrateError;
use crate::model::{Classification, ErrorKind};
use crate::traits::SymbolicSubstrate;

pub const NEAR_EQUIVALENT_SCORE: f64 = 0.95;

/// Classified kinds that fix the score, in the order they are consulted.
/// A sign error that is also a parentheses error scores as a sign error
/// even though parentheses errors score higher; grades stay comparable
/// with historical results only if this order is kept.
pub const CLASSIFICATION_TIERS: [(ErrorKind, f64); 3] = [
    (ErrorKind::SignError, 0.70),
    (ErrorKind::CoefficientError, 0.60),
    (ErrorKind::ParenthesesError, 0.80),
];

/// Unreachable through [`score`]: identical printed forms are equivalent.
pub const IDENTICAL_FORM_SCORE: f64 = 0.90;
pub const NO_TOKENS_SCORE: f64 = 0.3;
pub const FAILURE_SCORE: f64 = 0.2;

/// Score a non-equivalent pair. Always in [0, 1].
pub fn score<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
    classification: &Classification,
    near_tolerance: f64,
) -> f64 {
    match tiered_score(substrate, student, expected, classification, near_tolerance) {
        Ok(value) => value.clamp(0.0, 1.0),
        Err(e) => {
            debug!(substrate = substrate.name(), "scoring failed: {e}");
            FAILURE_SCORE
        }
    }
}

fn tiered_score<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
    classification: &Classification,
    near_tolerance: f64,
) -> Result<f64, SubstrateError> {
    if equivalent(substrate, student, expected, near_tolerance) {
        return Ok(NEAR_EQUIVALENT_SCORE);
    }

    if let Some((_, value)) = CLASSIFICATION_TIERS
        .iter()
        .find(|(kind, _)| classification.contains(*kind))
    {
        return Ok(*value);
    }

    if substrate.is_constant(student) && substrate.is_constant(expected) {
        let reference = substrate.evaluate(expected)?;
        if reference != 0.0 {
            let value = substrate.evaluate(student)?;
            return Ok((1.0 - (value - reference).abs() / reference.abs()).max(0.0));
        }
    }

    let student_form = substrate.render(student);
    let expected_form = substrate.render(expected);
    if student_form == expected_form {
        return Ok(IDENTICAL_FORM_SCORE);
    }

    Ok(jaccard(&tokens(&student_form), &tokens(&expected_form)).unwrap_or(NO_TOKENS_SCORE))
}

/// Letter runs, digit runs, and single operator or parenthesis characters.
pub fn tokens(text: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_ascii_alphabetic() || ch.is_ascii_digit() {
            let same_class = |c: &char| {
                if ch.is_ascii_alphabetic() {
                    c.is_ascii_alphabetic()
                } else {
                    c.is_ascii_digit()
                }
            };
            let mut run = String::from(ch);
            while let Some(next) = chars.next_if(same_class) {
                run.push(next);
            }
            out.insert(run);
        } else if "+-*/()^".contains(ch) {
            out.insert(ch.to_string());
        }
    }
    out
}

/// |A ∩ B| / |A ∪ B|, or `None` if either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    Some(intersection as f64 / union as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::equivalence::DEFAULT_TOLERANCE;
    use crate::substrate::ExactSubstrate;

    fn graded(student: &str, expected: &str) -> f64 {
        let s = ExactSubstrate::default();
        let a = s.parse(student).unwrap();
        let b = s.parse(expected).unwrap();
        let classification = classify(&s, &a, &b, DEFAULT_TOLERANCE);
        score(&s, &a, &b, &classification, 0.01)
    }

    fn unclassified(student: &str, expected: &str) -> f64 {
        let s = ExactSubstrate::default();
        let a = s.parse(student).unwrap();
        let b = s.parse(expected).unwrap();
        score(&s, &a, &b, &Classification::new(), 0.01)
    }

    #[test]
    fn near_equivalence_tier() {
        assert_eq!(graded("3.14", "pi"), NEAR_EQUIVALENT_SCORE);
    }

    #[test]
    fn classification_tiers() {
        assert_eq!(graded("-4", "4"), 0.70);
        assert_eq!(graded("2x + 2", "x + 1"), 0.60);
        assert_eq!(graded("2*x + 1", "2*(x+1)"), 0.80);
    }

    #[test]
    fn sign_outranks_parentheses() {
        let s = ExactSubstrate::default();
        let a = s.parse("x").unwrap();
        let b = s.parse("y").unwrap();
        let both: Classification = [ErrorKind::ParenthesesError, ErrorKind::SignError]
            .into_iter()
            .collect();
        assert_eq!(score(&s, &a, &b, &both, 0.01), 0.70);
    }

    #[test]
    fn identical_forms_stop_at_the_near_tier() {
        assert_eq!(unclassified("x + 1", "x + 1"), NEAR_EQUIVALENT_SCORE);
        assert_eq!(unclassified("sin(x)^2", "sin(x)^2"), NEAR_EQUIVALENT_SCORE);
    }

    #[test]
    fn relative_error_for_constants() {
        assert!((unclassified("9", "10") - 0.9).abs() < 1e-12);
        assert_eq!(unclassified("30", "10"), 0.0);
    }

    #[test]
    fn zero_reference_skips_relative_error() {
        // Tokens {5} and {0} share nothing.
        assert_eq!(unclassified("5", "0"), 0.0);
    }

    #[test]
    fn token_overlap() {
        // {x, +, 1} against {x, +, 2}: two shared out of four.
        assert!((graded("x + 1", "x + 2") - 0.5).abs() < 1e-12);
        assert_eq!(graded("a", "b"), 0.0);
    }

    #[test]
    fn tokenizer() {
        let t = tokens("2*x^10 + sin(ab)");
        let expected: BTreeSet<String> = ["2", "*", "x", "^", "10", "+", "sin", "(", "ab", ")"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(t, expected);
        assert!(tokens("   ").is_empty());
        assert_eq!(jaccard(&tokens(""), &tokens("x")), None);
    }
}
