//! A numeric-only substrate for tests.
//!
//! Handles constant arithmetic (`+ - * /`, parentheses, unary minus) over
//! `f64`. Anything with a symbol in it fails to parse.

use crate::error::SubstrateError;
use crate::traits::SymbolicSubstrate;

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatSubstrate;

impl SymbolicSubstrate for FloatSubstrate {
    type Expr = f64;

    fn name(&self) -> &str {
        "float"
    }

    fn parse(&self, text: &str) -> Result<f64, SubstrateError> {
        let mut parser = Arith {
            chars: text.chars().filter(|c| !c.is_whitespace()).collect(),
            pos: 0,
        };
        let value = parser.sum()?;
        if parser.pos != parser.chars.len() {
            return Err(SubstrateError::Parse(format!("trailing input in {text:?}")));
        }
        Ok(value)
    }

    fn simplify(&self, expr: &f64) -> Result<f64, SubstrateError> {
        self.evaluate(expr)
    }

    fn negate(&self, expr: &f64) -> f64 {
        -expr
    }

    fn subtract(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn divide(&self, a: &f64, b: &f64) -> f64 {
        a / b
    }

    fn is_constant(&self, _: &f64) -> bool {
        true
    }

    fn evaluate(&self, expr: &f64) -> Result<f64, SubstrateError> {
        if expr.is_finite() {
            Ok(*expr)
        } else {
            Err(SubstrateError::NonFinite)
        }
    }

    fn equals(&self, a: &f64, b: &f64) -> bool {
        a == b
    }

    fn render(&self, expr: &f64) -> String {
        expr.to_string()
    }

    fn power_base(&self, _: &f64) -> Option<f64> {
        None
    }
}

struct Arith {
    chars: Vec<char>,
    pos: usize,
}

impl Arith {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn sum(&mut self) -> Result<f64, SubstrateError> {
        let mut value = self.product()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.product()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn product(&mut self) -> Result<f64, SubstrateError> {
        let mut value = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, SubstrateError> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.sum()?;
                if self.peek() != Some(')') {
                    return Err(SubstrateError::Parse("unclosed parenthesis".into()));
                }
                self.pos += 1;
                Ok(value)
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Result<f64, SubstrateError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|_| SubstrateError::Parse(format!("expected a number at {start}")))
    }
}
