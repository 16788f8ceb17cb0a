//! [`SymbolicSubstrate`] over the exact arithmetic in `mathgrade-symbolic`.

use mathgrade_symbolic::{
    canonicalize, equals_with, evaluate_constant, simplify_with, EvalError, Expr, Limits,
    ParseError, SimplifyError,
};

use crate::error::SubstrateError;
use crate::traits::SymbolicSubstrate;

/// The default substrate: exact rational canonical forms with numeric
/// sampling as the equality fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSubstrate {
    limits: Limits,
}

impl ExactSubstrate {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl From<ParseError> for SubstrateError {
    fn from(err: ParseError) -> Self {
        SubstrateError::Parse(err.to_string())
    }
}

impl From<SimplifyError> for SubstrateError {
    fn from(err: SimplifyError) -> Self {
        match err {
            SimplifyError::DivisionByZero => SubstrateError::DivisionByZero,
            other => SubstrateError::Unsupported(other.to_string()),
        }
    }
}

impl From<EvalError> for SubstrateError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::DivisionByZero => SubstrateError::DivisionByZero,
            other => SubstrateError::Unsupported(other.to_string()),
        }
    }
}

impl SymbolicSubstrate for ExactSubstrate {
    type Expr = Expr;

    fn name(&self) -> &str {
        "exact"
    }

    fn parse(&self, text: &str) -> Result<Expr, SubstrateError> {
        Ok(mathgrade_symbolic::parse(text)?)
    }

    fn simplify(&self, expr: &Expr) -> Result<Expr, SubstrateError> {
        Ok(simplify_with(expr, &self.limits)?)
    }

    fn negate(&self, expr: &Expr) -> Expr {
        -expr.clone()
    }

    fn subtract(&self, a: &Expr, b: &Expr) -> Expr {
        a.clone() - b.clone()
    }

    fn divide(&self, a: &Expr, b: &Expr) -> Expr {
        a.clone() / b.clone()
    }

    fn is_constant(&self, expr: &Expr) -> bool {
        expr.is_constant()
    }

    fn evaluate(&self, expr: &Expr) -> Result<f64, SubstrateError> {
        let value = evaluate_constant(expr)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SubstrateError::NonFinite)
        }
    }

    fn equals(&self, a: &Expr, b: &Expr) -> bool {
        equals_with(a, b, &self.limits)
    }

    fn render(&self, expr: &Expr) -> String {
        expr.to_string()
    }

    fn power_base(&self, expr: &Expr) -> Option<Expr> {
        expr.power_base().cloned()
    }

    fn is_zero(&self, expr: &Expr) -> bool {
        canonicalize(expr, &self.limits).is_ok_and(|form| form.is_zero())
    }
}
