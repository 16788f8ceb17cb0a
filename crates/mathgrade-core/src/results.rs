//! Per-case outcomes of a batch run.

use serde::{Deserialize, Serialize};

use crate::model::{
    AnswerCase, Classification, EvaluationResult, StepCase, StepEvaluationSummary,
};

/// Score comparisons allow this much slack for rounding.
const SCORE_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseKind {
    Answer,
    Steps,
}

/// What the evaluator returned for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaseOutput {
    Answer(EvaluationResult),
    Steps(StepEvaluationSummary),
}

/// The graded result of one case, plus any expectation it missed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case_id: String,
    pub kind: CaseKind,
    /// The answer score, or the global score of a step case.
    pub score: f64,
    /// For step cases, whether every step was correct.
    pub is_correct: bool,
    /// Empty for step cases.
    pub classification: Classification,
    #[serde(default)]
    pub tags: Vec<String>,
    pub output: CaseOutput,
    /// Whether the case declared any expectation.
    pub has_expectation: bool,
    /// One message per unmet expectation.
    #[serde(default)]
    pub failures: Vec<String>,
}

impl CaseOutcome {
    pub fn from_answer(case: &AnswerCase, result: EvaluationResult) -> Self {
        let failures = answer_failures(case, &result);
        Self {
            case_id: case.id.clone(),
            kind: CaseKind::Answer,
            score: result.score,
            is_correct: result.is_correct,
            classification: result.classification.clone(),
            tags: case.tags.clone(),
            has_expectation: case.expect.is_some(),
            failures,
            output: CaseOutput::Answer(result),
        }
    }

    pub fn from_steps(case: &StepCase, summary: StepEvaluationSummary) -> Self {
        let mut failures = Vec::new();
        if let Some(min) = case.min_global_score {
            if summary.global_score + SCORE_SLACK < min {
                failures.push(format!(
                    "global score {:.2} is below {min:.2}",
                    summary.global_score
                ));
            }
        }
        Self {
            case_id: case.id.clone(),
            kind: CaseKind::Steps,
            score: summary.global_score,
            is_correct: !summary.step_results.is_empty()
                && summary.step_results.iter().all(|s| s.is_correct),
            classification: Classification::new(),
            tags: case.tags.clone(),
            has_expectation: case.min_global_score.is_some(),
            failures,
            output: CaseOutput::Steps(summary),
        }
    }

    /// True when the case declared expectations and met all of them.
    pub fn passed(&self) -> bool {
        self.has_expectation && self.failures.is_empty()
    }
}

fn answer_failures(case: &AnswerCase, result: &EvaluationResult) -> Vec<String> {
    let mut failures = Vec::new();
    let Some(expect) = &case.expect else {
        return failures;
    };

    if let Some(expected) = expect.is_correct {
        if expected != result.is_correct {
            failures.push(format!(
                "expected is_correct = {expected}, got {}",
                result.is_correct
            ));
        }
    }
    if let Some(min) = expect.min_score {
        if result.score + SCORE_SLACK < min {
            failures.push(format!("score {:.2} is below {min:.2}", result.score));
        }
    }
    if let Some(max) = expect.max_score {
        if result.score > max + SCORE_SLACK {
            failures.push(format!("score {:.2} is above {max:.2}", result.score));
        }
    }
    for kind in &expect.classification {
        if !result.classification.contains(*kind) {
            failures.push(format!(
                "expected {kind} in classification, got {}",
                result.classification
            ));
        }
    }
    failures
}
