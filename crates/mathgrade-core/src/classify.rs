//! Error classifier.
//!
//! Each hypothesis is tested on its own; every kind that matches is
//! reported. Scoring later consumes them in [`ErrorKind`] priority order.

use crate::equivalence::equivalent;
use crate::model::{Classification, ErrorKind};
use crate::traits::SymbolicSubstrate;

/// Ratios closer than this to 1 or -1 are not coefficient errors.
const UNIT_RATIO_EPSILON: f64 = 1e-12;

/// Classify why `student` differs from `expected`. Call only when the two
/// are not equivalent.
pub fn classify<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
    tolerance: f64,
) -> Classification {
    let mut classification = Classification::new();
    for kind in ErrorKind::ALL {
        let matched = match kind {
            ErrorKind::SignError => is_sign_error(substrate, student, expected, tolerance),
            ErrorKind::CoefficientError => is_coefficient_error(substrate, student, expected),
            ErrorKind::ParenthesesError => is_parentheses_error(substrate, student, expected),
            ErrorKind::ExponentError => is_exponent_error(substrate, student, expected),
        };
        if matched {
            classification.insert(kind);
        }
    }
    classification
}

/// `student` is equivalent to `-expected`.
pub fn is_sign_error<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
    tolerance: f64,
) -> bool {
    equivalent(substrate, student, &substrate.negate(expected), tolerance)
}

/// `student / expected` simplifies to a constant other than 1 or -1.
/// A zero `expected` means the test does not apply.
pub fn is_coefficient_error<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
) -> bool {
    if substrate.is_zero(expected) {
        return false;
    }
    let Ok(ratio) = substrate.simplify(&substrate.divide(student, expected)) else {
        return false;
    };
    if !substrate.is_constant(&ratio) {
        return false;
    }
    substrate.evaluate(&ratio).is_ok_and(|value| {
        (value - 1.0).abs() > UNIT_RATIO_EPSILON && (value + 1.0).abs() > UNIT_RATIO_EPSILON
    })
}

/// The printed forms match once every parenthesis is removed, and the
/// expected form has at least one. This is a textual heuristic: unrelated
/// expressions whose flattened forms coincide are also flagged.
pub fn is_parentheses_error<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
) -> bool {
    let expected_form = substrate.render(expected);
    if !expected_form.contains('(') {
        return false;
    }
    strip_parens(&substrate.render(student)) == strip_parens(&expected_form)
}

/// `expected` is a power and `student` equals its base.
pub fn is_exponent_error<S: SymbolicSubstrate>(
    substrate: &S,
    student: &S::Expr,
    expected: &S::Expr,
) -> bool {
    substrate
        .power_base(expected)
        .is_some_and(|base| substrate.equals(student, &base))
}

fn strip_parens(text: &str) -> String {
    text.chars().filter(|c| *c != '(' && *c != ')').collect()
}
