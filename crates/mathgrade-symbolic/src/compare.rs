//! Equality of two expressions.

use std::collections::BTreeMap;

use tracing::debug;

use crate::canonical::{canonicalize, Limits};
use crate::eval::evaluate;
use crate::expr::Expr;

/// Base sample values. Chosen away from small integers and simple fractions
/// so that accidental agreement is unlikely. Each magnitude appears with both
/// signs, and consecutive entries alternate, so symbols bound in the same
/// round get mixed signs.
const SAMPLE_POINTS: [f64; 16] = [
    0.5772, -1.3247, 2.7183, -0.3183, 1.618, -2.2361, 0.7071, -3.1416, -0.5772, 1.3247, -2.7183,
    0.3183, -1.618, 2.2361, -0.7071, 3.1416,
];

/// Points that must agree before numeric comparison reports equality.
const MIN_AGREEING_POINTS: usize = 3;

const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Whether `a` and `b` denote the same value.
///
/// Canonical forms are compared exactly first. When they differ, both
/// expressions are evaluated at a fixed set of sample points; points where
/// either side is undefined are skipped, any disagreement is final, and at
/// least three agreeing points are required.
pub fn equals(a: &Expr, b: &Expr) -> bool {
    equals_with(a, b, &Limits::default())
}

pub fn equals_with(a: &Expr, b: &Expr, limits: &Limits) -> bool {
    if a == b {
        return true;
    }
    if let (Ok(ca), Ok(cb)) = (canonicalize(a, limits), canonicalize(b, limits)) {
        if ca.same_value(&cb, limits).unwrap_or(false) {
            return true;
        }
    }
    sample_equal(a, b)
}

fn sample_equal(a: &Expr, b: &Expr) -> bool {
    let mut symbols = a.free_symbols();
    symbols.extend(b.free_symbols());

    let mut agreeing = 0;
    for round in 0..SAMPLE_POINTS.len() {
        let bindings: BTreeMap<String, f64> = symbols
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let base = SAMPLE_POINTS[(round + index) % SAMPLE_POINTS.len()];
                (name.clone(), base + 0.1 * index as f64)
            })
            .collect();

        let (Ok(va), Ok(vb)) = (evaluate(a, &bindings), evaluate(b, &bindings)) else {
            continue;
        };
        if !va.is_finite() || !vb.is_finite() {
            continue;
        }
        let scale = va.abs().max(vb.abs()).max(1.0);
        if (va - vb).abs() > RELATIVE_TOLERANCE * scale {
            debug!(%a, %b, lhs = va, rhs = vb, "sample disagrees");
            return false;
        }
        agreeing += 1;
    }
    agreeing >= MIN_AGREEING_POINTS
}
