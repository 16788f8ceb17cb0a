//! Unevaluated expression tree and its printed form.
//!
//! The tree keeps the shape the user typed: `2*(x+1)` stays a product of a
//! number and a sum, and nothing is folded at construction time. Printing
//! uses the minimal parentheses required by operator precedence, so the
//! printed form of `2*(x+1)` is `2*(x + 1)` while `2*x+1` prints `2*x + 1`.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    Infinity,
}

impl Constant {
    /// Resolve an identifier to a constant.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" | "Pi" | "PI" => Some(Constant::Pi),
            "e" | "E" => Some(Constant::E),
            "oo" | "inf" | "infinity" => Some(Constant::Infinity),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::Infinity => f64::INFINITY,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Pi => write!(f, "pi"),
            Constant::E => write!(f, "E"),
            Constant::Infinity => write!(f, "oo"),
        }
    }
}

/// Unary functions understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Abs,
}

impl Function {
    /// Every spelling accepted for a function, longest first so that prefix
    /// matching in the lexer prefers `sqrt` over shorter names.
    pub const NAMES: &'static [(&'static str, Function)] = &[
        ("sqrt", Function::Sqrt),
        ("sin", Function::Sin),
        ("cos", Function::Cos),
        ("tan", Function::Tan),
        ("exp", Function::Exp),
        ("log", Function::Ln),
        ("abs", Function::Abs),
        ("ln", Function::Ln),
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, func)| *func)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Ln => "log",
            Function::Abs => "abs",
        }
    }

    /// Apply the function to a real argument. Returns `None` outside the
    /// real domain.
    pub fn apply(self, x: f64) -> Option<f64> {
        let value = match self {
            Function::Sqrt if x < 0.0 => return None,
            Function::Sqrt => x.sqrt(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Exp => x.exp(),
            Function::Ln if x <= 0.0 => return None,
            Function::Ln => x.ln(),
            Function::Abs => x.abs(),
        };
        (!value.is_nan()).then_some(value)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// An exact rational literal. Decimals are stored exactly (`0.5` is `1/2`).
    Number(BigRational),
    Constant(Constant),
    Symbol(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn integer(n: i64) -> Self {
        Expr::Number(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn rational(numer: i64, denom: i64) -> Self {
        Expr::Number(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn pow(self, exponent: Expr) -> Self {
        Expr::Pow(Box::new(self), Box::new(exponent))
    }

    pub fn call(func: Function, arg: Expr) -> Self {
        Expr::Call(func, Box::new(arg))
    }

    /// Names of all symbols occurring in the expression, sorted.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_symbols(out),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => {
                l.collect_symbols(out);
                r.collect_symbols(out);
            }
        }
    }

    /// True when the expression contains no free symbols.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => true,
            Expr::Symbol(_) => false,
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.is_constant(),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => l.is_constant() && r.is_constant(),
        }
    }

    /// The base of a power expression. `sqrt(u)` counts as `u^(1/2)`.
    pub fn power_base(&self) -> Option<&Expr> {
        match self {
            Expr::Pow(base, _) => Some(base),
            Expr::Call(Function::Sqrt, arg) => Some(arg),
            _ => None,
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => 1,
            Expr::Neg(inner) | Expr::Call(_, inner) => 1 + inner.size(),
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => 1 + l.size() + r.size(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Number(n) if n.is_negative() => 3,
            Expr::Number(n) if !n.is_integer() => 2,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }

    fn is_negative_form(&self) -> bool {
        match self {
            Expr::Neg(_) => true,
            Expr::Number(n) => n.is_negative(),
            _ => false,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: &BigRational) -> fmt::Result {
    if n.denom().is_one() {
        write!(f, "{}", n.numer())
    } else {
        write!(f, "{}/{}", n.numer(), n.denom())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write_number(f, n),
            Expr::Constant(c) => write!(f, "{c}"),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                write_operand(f, inner, inner.precedence() <= 1 || inner.is_negative_form())
            }
            Expr::Add(l, r) => {
                write!(f, "{l}")?;
                match r.as_ref() {
                    Expr::Neg(inner) => {
                        f.write_str(" - ")?;
                        write_operand(f, inner, inner.precedence() <= 1 || inner.is_negative_form())
                    }
                    Expr::Number(n) if n.is_negative() => {
                        f.write_str(" - ")?;
                        write_number(f, &n.abs())
                    }
                    _ => {
                        f.write_str(" + ")?;
                        write!(f, "{r}")
                    }
                }
            }
            Expr::Sub(l, r) => {
                write!(f, "{l} - ")?;
                write_operand(f, r, r.precedence() <= 1 || r.is_negative_form())
            }
            Expr::Mul(l, r) => {
                write_operand(f, l, l.precedence() < 2)?;
                f.write_str("*")?;
                write_operand(f, r, r.precedence() < 2 || r.is_negative_form())
            }
            Expr::Div(l, r) => {
                write_operand(f, l, l.precedence() < 2)?;
                f.write_str("/")?;
                write_operand(f, r, r.precedence() <= 2 || r.is_negative_form())
            }
            Expr::Pow(base, exponent) => {
                write_operand(f, base, base.precedence() <= 4)?;
                f.write_str("^")?;
                write_operand(
                    f,
                    exponent,
                    exponent.precedence() < 4 || exponent.is_negative_form(),
                )
            }
            Expr::Call(func, arg) => write!(f, "{func}({arg})"),
        }
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::integer(n)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl std::ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);
