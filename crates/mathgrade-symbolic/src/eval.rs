//! Floating-point evaluation of expression trees.

use std::collections::BTreeMap;

use num_traits::ToPrimitive;

use crate::error::EvalError;
use crate::expr::Expr;

/// Evaluate `expr` with symbols bound to the given values.
pub fn evaluate(expr: &Expr, bindings: &BTreeMap<String, f64>) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(value) => Ok(value.to_f64().unwrap_or(f64::NAN)),
        Expr::Constant(constant) => Ok(constant.value()),
        Expr::Symbol(name) => bindings
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnboundSymbol(name.clone())),
        Expr::Neg(inner) => Ok(-evaluate(inner, bindings)?),
        Expr::Add(l, r) => Ok(evaluate(l, bindings)? + evaluate(r, bindings)?),
        Expr::Sub(l, r) => Ok(evaluate(l, bindings)? - evaluate(r, bindings)?),
        Expr::Mul(l, r) => Ok(evaluate(l, bindings)? * evaluate(r, bindings)?),
        Expr::Div(l, r) => {
            let divisor = evaluate(r, bindings)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(evaluate(l, bindings)? / divisor)
        }
        Expr::Pow(base, exponent) => {
            let base = evaluate(base, bindings)?;
            let exponent = evaluate(exponent, bindings)?;
            if base == 0.0 && exponent < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            let value = base.powf(exponent);
            if value.is_nan() {
                Err(EvalError::Domain(format!("{base}^{exponent}")))
            } else {
                Ok(value)
            }
        }
        Expr::Call(func, arg) => {
            let arg = evaluate(arg, bindings)?;
            func.apply(arg)
                .ok_or_else(|| EvalError::Domain(format!("{func}({arg})")))
        }
    }
}

/// Evaluate an expression that has no free symbols.
pub fn evaluate_constant(expr: &Expr) -> Result<f64, EvalError> {
    evaluate(expr, &BTreeMap::new())
}
