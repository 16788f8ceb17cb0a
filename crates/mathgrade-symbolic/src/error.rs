//! Error types for parsing, simplification and numeric evaluation.

use thiserror::Error;

/// Errors produced while turning text into an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no tokens.
    #[error("empty expression")]
    Empty,

    /// A character outside the expression vocabulary.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// A token that cannot appear at this position.
    #[error("unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    /// The input ended while an operand was still expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis opened at offset {0}")]
    UnclosedParen(usize),

    /// A numeric literal could not be read.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    /// A function name was not followed by an argument.
    #[error("function '{0}' is missing its argument")]
    MissingArgument(String),

    /// Comparisons and equations are not algebraic expressions.
    #[error("relational operator '{0}' is not supported in an expression")]
    Relation(String),

    /// Nesting past the supported depth.
    #[error("expression is nested more than {0} levels deep")]
    TooDeep(usize),
}

/// Errors produced while reducing an expression to canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimplifyError {
    #[error("division by zero")]
    DivisionByZero,

    /// A value outside a function's real domain (e.g. `(-4)^(1/2)`).
    #[error("domain error: {0}")]
    Domain(String),

    /// Expansion exceeded the configured term limit.
    #[error("expression too large to expand ({0} terms)")]
    TooComplex(usize),
}

/// Errors produced while evaluating an expression to a floating-point value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("symbol '{0}' has no value")]
    UnboundSymbol(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("'{0}' is undefined for this argument")]
    Domain(String),
}
