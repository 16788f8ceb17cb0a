//! mathgrade-symbolic: a small symbolic-expression substrate.
//!
//! Parses infix text into an unevaluated [`Expr`] tree, reduces expressions
//! to an exact rational-function canonical form, evaluates constant
//! subexpressions numerically, and tests two expressions for equality.
//!
//! ```
//! use mathgrade_symbolic::{parse, simplify};
//!
//! let expr = parse("(x+1)^2 - (x^2 + 2x + 1)").unwrap();
//! assert_eq!(simplify(&expr).unwrap().to_string(), "0");
//! ```

pub mod canonical;
pub mod compare;
pub mod error;
pub mod eval;
pub mod expr;
pub mod lexer;
pub mod parser;

pub use canonical::{canonicalize, simplify, simplify_with, Canonical, Limits};
pub use compare::{equals, equals_with};
pub use error::{EvalError, ParseError, SimplifyError};
pub use eval::{evaluate, evaluate_constant};
pub use expr::{Constant, Expr, Function};
pub use parser::parse;
