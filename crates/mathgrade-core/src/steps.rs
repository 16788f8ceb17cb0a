//! Step sequence evaluation.
//!
//! Each step is graded on its own against either its matching reference
//! step or the final answer. Steps never see each other's results.

use tracing::debug;

use crate::engine::{round2, MathEvaluator};
use crate::model::{StepEvaluationSummary, StepResult};
use crate::traits::SymbolicSubstrate;

impl<S: SymbolicSubstrate> MathEvaluator<S> {
    /// Grade `steps` in order.
    ///
    /// Step `i` is compared with `expected_steps[i]` when that exists and is
    /// not blank, else with `expected_answer`. A leading `name =` is removed
    /// from both sides first, so `x = 5` grades as `5`.
    pub fn evaluate_steps<T: AsRef<str>>(
        &self,
        steps: &[T],
        expected_answer: &str,
        expected_steps: Option<&[String]>,
    ) -> StepEvaluationSummary {
        let templates = self.templates();
        let reference_steps = expected_steps.unwrap_or_default();

        let mut total = 0.0;
        let mut step_results = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let step = step.as_ref();
            let reference = reference_steps
                .get(index)
                .map(String::as_str)
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(expected_answer);

            let result = self.evaluate_answer(strip_assignment(step), strip_assignment(reference));
            total += result.score;

            let (hint, corrected_step) = if result.is_correct {
                (None, None)
            } else {
                let hint = result
                    .hints
                    .first()
                    .cloned()
                    .unwrap_or_else(|| templates.step_hint.to_string());
                (Some(hint), Some(result.correct_answer.clone()))
            };

            step_results.push(StepResult {
                index,
                step_text: step.to_string(),
                is_correct: result.is_correct,
                score: result.score,
                hint,
                corrected_step,
            });
        }

        let global_score = round2(total / steps.len().max(1) as f64);
        debug!(steps = steps.len(), global_score, "graded step sequence");

        let restated = format!("{}{expected_answer}", templates.expected_answer_prefix);
        let mut generated_solution: Vec<String> = if reference_steps.is_empty() {
            templates.solution_outline.iter().map(|s| s.to_string()).collect()
        } else {
            reference_steps.to_vec()
        };
        generated_solution.push(restated);

        StepEvaluationSummary {
            global_score,
            step_results,
            generated_solution,
            correct_answer: expected_answer.to_string(),
        }
    }
}

/// Drop a leading `identifier =` from `text`. Anything else, including
/// `==` and relations like `x <= 3`, is returned trimmed but unchanged.
pub fn strip_assignment(text: &str) -> &str {
    let trimmed = text.trim();
    let Some((lhs, rhs)) = trimmed.split_once('=') else {
        return trimmed;
    };
    if rhs.starts_with('=') || !is_identifier(lhs.trim()) {
        return trimmed;
    }
    rhs.trim()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
