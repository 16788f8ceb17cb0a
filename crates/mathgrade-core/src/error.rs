//! Error types.
//!
//! Substrate errors never cross the engine boundary: the evaluator turns
//! them into low-score results. They are typed so that callers of the
//! substrate directly (the `inspect` command, tests) can match on them.

use thiserror::Error;

/// Errors reported by a symbolic substrate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstrateError {
    /// The text is not a well-formed expression.
    #[error("parse error: {0}")]
    Parse(String),

    /// An exactly-zero divisor was met while simplifying or evaluating.
    #[error("division by zero")]
    DivisionByZero,

    /// Numeric evaluation produced NaN or an infinity.
    #[error("value is not finite")]
    NonFinite,

    /// The substrate cannot perform the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// Errors in engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown locale: {0} (expected one of: en, fr)")]
    UnknownLocale(String),

    #[error("tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),

    #[error("near_tolerance ({near}) must not be smaller than tolerance ({exact})")]
    NearToleranceTooSmall { near: f64, exact: f64 },

    #[error("max_hints must be at least 1")]
    NoHints,

    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },
}
