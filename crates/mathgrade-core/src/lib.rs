//! mathgrade-core: the math answer evaluation engine.
//!
//! Grades free-form algebraic answers against a reference. The pipeline is
//! normalize, parse, check equivalence, classify the error, score, then
//! generate feedback. It is written against the [`SymbolicSubstrate`]
//! capability, with [`ExactSubstrate`] as the default.
//!
//! ```
//! use mathgrade_core::{evaluate_answer, evaluate_steps, ErrorKind};
//!
//! let result = evaluate_answer("x^2 + 2x + 1", "(x+1)^2");
//! assert!(result.is_correct);
//!
//! let result = evaluate_answer("-4", "4");
//! assert_eq!(result.score, 0.7);
//! assert!(result.classification.contains(ErrorKind::SignError));
//!
//! let summary = evaluate_steps(&["x = 5", "10"], "x = 10", None);
//! assert_eq!(summary.global_score, 0.8);
//! ```
//!
//! Batch grading of TOML grade sets, reports, and drift comparison live in
//! [`batch`], [`parser`], and [`report`].

pub mod batch;
pub mod classify;
pub mod config;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod expression;
pub mod feedback;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod results;
pub mod scoring;
pub mod statistics;
pub mod steps;
pub mod substrate;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use engine::{evaluate_answer, evaluate_steps, MathEvaluator};
pub use error::{EngineError, SubstrateError};
pub use feedback::Locale;
pub use model::{
    Classification, ErrorKind, EvaluationResult, Explanation, Inspection, ParsedExpression,
    RawAnswer, Role, StepEvaluationSummary, StepResult,
};
pub use substrate::ExactSubstrate;
pub use traits::SymbolicSubstrate;
