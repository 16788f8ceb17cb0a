//! The symbolic-substrate capability the engine is written against.
//!
//! The engine never touches a concrete expression type. Everything it needs
//! (parsing, simplification, unevaluated construction, numeric evaluation,
//! equality, printing) goes through [`SymbolicSubstrate`], so the grading
//! algorithm can run on the exact substrate in [`crate::substrate`] or on a
//! minimal fake in tests.

use std::fmt::Debug;

use crate::error::SubstrateError;

/// A stateless library of symbolic-expression operations.
///
/// Implementations must be safe to share across threads: the engine holds a
/// single substrate and calls it from concurrent evaluations.
pub trait SymbolicSubstrate: Send + Sync {
    /// The substrate's expression value.
    type Expr: Clone + Debug + Send + Sync;

    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Parse normalized text into an unevaluated expression.
    fn parse(&self, text: &str) -> Result<Self::Expr, SubstrateError>;

    /// Algebraically simplify an expression.
    fn simplify(&self, expr: &Self::Expr) -> Result<Self::Expr, SubstrateError>;

    /// `-expr`, unevaluated.
    fn negate(&self, expr: &Self::Expr) -> Self::Expr;

    /// `a - b`, unevaluated.
    fn subtract(&self, a: &Self::Expr, b: &Self::Expr) -> Self::Expr;

    /// `a / b`, unevaluated.
    fn divide(&self, a: &Self::Expr, b: &Self::Expr) -> Self::Expr;

    /// True when the expression has no free symbols.
    fn is_constant(&self, expr: &Self::Expr) -> bool;

    /// Numeric value of a constant expression.
    fn evaluate(&self, expr: &Self::Expr) -> Result<f64, SubstrateError>;

    /// Symbolic equality.
    fn equals(&self, a: &Self::Expr, b: &Self::Expr) -> bool;

    /// Printed form.
    fn render(&self, expr: &Self::Expr) -> String;

    /// The base of a power expression, if `expr` is one.
    fn power_base(&self, expr: &Self::Expr) -> Option<Self::Expr>;

    /// True when `expr` is a constant that evaluates to exactly zero.
    fn is_zero(&self, expr: &Self::Expr) -> bool {
        self.is_constant(expr)
            && self
                .simplify(expr)
                .and_then(|simplified| self.evaluate(&simplified))
                .is_ok_and(|value| value == 0.0)
    }
}
