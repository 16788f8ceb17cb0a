//! Core data model types for mathgrade.
//!
//! Per-request values (answers, parsed expressions, results) and the
//! grade-set types that batch grading loads from TOML.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side of a comparison a piece of text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Expected,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Expected => write!(f, "expected"),
        }
    }
}

/// Input text as submitted, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnswer {
    pub text: String,
    pub role: Role,
}

impl RawAnswer {
    pub fn student(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Student,
        }
    }

    pub fn expected(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Expected,
        }
    }
}

/// Result of the parse stage. `tree` is `None` exactly when parsing failed.
#[derive(Debug, Clone)]
pub struct ParsedExpression<E> {
    /// Text as submitted.
    pub source_text: String,
    /// Text after normalization, as handed to the parser.
    pub normalized: String,
    pub tree: Option<E>,
}

impl<E> ParsedExpression<E> {
    pub fn is_valid(&self) -> bool {
        self.tree.is_some()
    }
}

/// A named hypothesis for why a wrong answer is wrong.
///
/// Variants are declared in scoring priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SignError,
    CoefficientError,
    ParenthesesError,
    ExponentError,
}

impl ErrorKind {
    /// Every kind, in priority order.
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::SignError,
        ErrorKind::CoefficientError,
        ErrorKind::ParenthesesError,
        ErrorKind::ExponentError,
    ];
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::SignError => write!(f, "sign_error"),
            ErrorKind::CoefficientError => write!(f, "coefficient_error"),
            ErrorKind::ParenthesesError => write!(f, "parentheses_error"),
            ErrorKind::ExponentError => write!(f, "exponent_error"),
        }
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sign_error" | "sign" => Ok(ErrorKind::SignError),
            "coefficient_error" | "coefficient" => Ok(ErrorKind::CoefficientError),
            "parentheses_error" | "parentheses" => Ok(ErrorKind::ParenthesesError),
            "exponent_error" | "exponent" => Ok(ErrorKind::ExponentError),
            other => Err(format!("unknown error kind: {other}")),
        }
    }
}

/// The set of error kinds that matched a wrong answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(BTreeSet<ErrorKind>);

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ErrorKind) {
        self.0.insert(kind);
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Kinds in priority order.
    pub fn iter(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ErrorKind> for Classification {
    fn from_iter<I: IntoIterator<Item = ErrorKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self.iter().map(|k| k.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Outcome of grading one answer against one reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub is_correct: bool,
    /// In [0, 1], rounded to two decimals. Exactly 1.0 when correct.
    pub score: f64,
    pub feedback: String,
    /// At most `max_hints` entries.
    pub hints: Vec<String>,
    /// Printed form of the reference.
    pub correct_answer: String,
    /// Empty when correct.
    pub classification: Classification,
}

/// Outcome of one step in a step sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub index: usize,
    pub step_text: String,
    pub is_correct: bool,
    pub score: f64,
    pub hint: Option<String>,
    pub corrected_step: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvaluationSummary {
    /// Mean of the per-step scores, rounded to two decimals.
    pub global_score: f64,
    pub step_results: Vec<StepResult>,
    pub generated_solution: Vec<String>,
    pub correct_answer: String,
}

/// A worked explanation of an [`EvaluationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub steps: Vec<String>,
    /// How much the grade should be trusted, in [0, 1].
    pub confidence: f64,
}

/// Diagnostic view of how the engine reads one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub source: String,
    pub normalized: String,
    pub is_valid: bool,
    pub parsed: Option<String>,
    pub simplified: Option<String>,
    pub numeric_value: Option<f64>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Grade sets
// ---------------------------------------------------------------------------

/// A single-answer grading case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerCase {
    pub id: String,
    pub student: String,
    pub expected: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// What the grade is expected to be. Cases without one are graded
    /// but never fail.
    #[serde(default)]
    pub expect: Option<AnswerExpectation>,
}

/// Bounds a grade must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerExpectation {
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    /// Kinds that must all appear in the classification.
    #[serde(default)]
    pub classification: Vec<ErrorKind>,
}

/// A step-sequence grading case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCase {
    pub id: String,
    pub steps: Vec<String>,
    pub expected: String,
    #[serde(default)]
    pub expected_steps: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub min_global_score: Option<f64>,
}

/// A collection of grading cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cases: Vec<AnswerCase>,
    #[serde(default)]
    pub step_cases: Vec<StepCase>,
}

impl GradeSet {
    pub fn case_count(&self) -> usize {
        self.cases.len() + self.step_cases.len()
    }

    /// Keep only cases whose id contains `pattern` or that carry it as a tag.
    pub fn filtered(&self, pattern: &str) -> GradeSet {
        let matches = |id: &str, tags: &[String]| id.contains(pattern) || tags.iter().any(|t| t == pattern);
        GradeSet {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            cases: self
                .cases
                .iter()
                .filter(|c| matches(&c.id, &c.tags))
                .cloned()
                .collect(),
            step_cases: self
                .step_cases
                .iter()
                .filter(|c| matches(&c.id, &c.tags))
                .cloned()
                .collect(),
        }
    }
}
