//! Equivalence checker.

use tracing::debug;

use crate::error::SubstrateError;
use crate::traits::SymbolicSubstrate;

/// Default absolute tolerance for constant differences.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Whether `a` and `b` are mathematically equivalent.
///
/// The difference `a - b` is simplified. A constant difference is compared
/// against `tolerance`; otherwise the substrate's symbolic equality decides.
/// Identical printed forms are always equivalent. Any substrate failure
/// counts as "not equivalent".
pub fn equivalent<S: SymbolicSubstrate>(
    substrate: &S,
    a: &S::Expr,
    b: &S::Expr,
    tolerance: f64,
) -> bool {
    if substrate.render(a) == substrate.render(b) {
        return true;
    }
    match check(substrate, a, b, tolerance) {
        Ok(result) => result,
        Err(e) => {
            debug!(
                substrate = substrate.name(),
                lhs = %substrate.render(a),
                rhs = %substrate.render(b),
                "equivalence check failed, treating as different: {e}"
            );
            false
        }
    }
}

fn check<S: SymbolicSubstrate>(
    substrate: &S,
    a: &S::Expr,
    b: &S::Expr,
    tolerance: f64,
) -> Result<bool, SubstrateError> {
    let difference = substrate.simplify(&substrate.subtract(a, b))?;
    if substrate.is_constant(&difference) {
        let value = substrate.evaluate(&difference)?;
        return Ok(value.abs() < tolerance);
    }
    Ok(substrate.equals(a, b))
}
