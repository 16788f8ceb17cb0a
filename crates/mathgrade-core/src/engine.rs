//! The answer evaluator.
//!
//! [`MathEvaluator`] runs the full pipeline for one (student, expected)
//! pair: normalize, parse, equivalence, classification, scoring, feedback.
//! It holds only read-only configuration and a stateless substrate, so one
//! instance can be shared freely across threads.

use tracing::debug;

use crate::classify::classify;
use crate::config::EngineConfig;
use crate::equivalence::equivalent;
use crate::expression::parse_expression;
use crate::feedback::{self, feedback_for, hints_for, Templates};
use crate::model::{
    Classification, EvaluationResult, Explanation, Inspection, ParsedExpression, RawAnswer,
    StepEvaluationSummary,
};
use crate::scoring;
use crate::substrate::ExactSubstrate;
use crate::traits::SymbolicSubstrate;

/// Grades answers against references.
#[derive(Debug, Clone)]
pub struct MathEvaluator<S = ExactSubstrate> {
    substrate: S,
    config: EngineConfig,
}

impl MathEvaluator<ExactSubstrate> {
    /// An evaluator on the exact substrate, bounded by the config's limits.
    pub fn new(config: EngineConfig) -> Self {
        let substrate = ExactSubstrate::new(config.limits());
        Self { substrate, config }
    }
}

impl Default for MathEvaluator<ExactSubstrate> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: SymbolicSubstrate> MathEvaluator<S> {
    pub fn with_substrate(substrate: S, config: EngineConfig) -> Self {
        Self { substrate, config }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn templates(&self) -> &'static Templates {
        self.config.locale.templates()
    }

    /// Normalize and parse one answer.
    pub fn parse(&self, answer: &RawAnswer) -> ParsedExpression<S::Expr> {
        parse_expression(&self.substrate, answer)
    }

    /// Equivalence at the configured tolerance.
    pub fn equivalent(&self, a: &S::Expr, b: &S::Expr) -> bool {
        equivalent(&self.substrate, a, b, self.config.tolerance)
    }

    pub fn classify(&self, student: &S::Expr, expected: &S::Expr) -> Classification {
        classify(&self.substrate, student, expected, self.config.tolerance)
    }

    /// Partial credit for a non-equivalent pair, unrounded.
    pub fn score(&self, student: &S::Expr, expected: &S::Expr, classification: &Classification) -> f64 {
        scoring::score(
            &self.substrate,
            student,
            expected,
            classification,
            self.config.near_tolerance,
        )
    }

    /// Grade `student_text` against `expected_text`. Never fails: malformed
    /// input produces a zero score with explanatory feedback.
    pub fn evaluate_answer(&self, student_text: &str, expected_text: &str) -> EvaluationResult {
        let templates = self.templates();
        let student = self.parse(&RawAnswer::student(student_text));
        let expected = self.parse(&RawAnswer::expected(expected_text));

        let correct_answer = match &expected.tree {
            Some(tree) => self.substrate.render(tree),
            None => expected_text.trim().to_string(),
        };

        let (Some(student_tree), Some(expected_tree)) = (&student.tree, &expected.tree) else {
            debug!(
                student_valid = student.is_valid(),
                expected_valid = expected.is_valid(),
                "answer not gradable"
            );
            return EvaluationResult {
                is_correct: false,
                score: 0.0,
                feedback: templates.invalid_expression.to_string(),
                hints: vec![templates.syntax_hint.to_string()],
                correct_answer,
                classification: Classification::new(),
            };
        };

        if self.equivalent(student_tree, expected_tree) {
            return EvaluationResult {
                is_correct: true,
                score: 1.0,
                feedback: templates.correct.to_string(),
                hints: Vec::new(),
                correct_answer,
                classification: Classification::new(),
            };
        }

        let classification = self.classify(student_tree, expected_tree);
        let score = round2(self.score(student_tree, expected_tree, &classification));
        debug!(%classification, score, "graded incorrect answer");

        EvaluationResult {
            is_correct: false,
            score,
            feedback: feedback_for(score, templates).to_string(),
            hints: hints_for(&classification, templates, self.config.max_hints),
            correct_answer,
            classification,
        }
    }

    /// A worked explanation for a result this evaluator produced.
    pub fn explain(&self, result: &EvaluationResult) -> Explanation {
        feedback::explain(result, self.templates())
    }

    /// How the engine reads `text`, for debugging.
    pub fn inspect(&self, text: &str) -> Inspection {
        let parsed = self.parse(&RawAnswer::student(text));
        let mut inspection = Inspection {
            source: parsed.source_text.clone(),
            normalized: parsed.normalized.clone(),
            is_valid: parsed.is_valid(),
            parsed: None,
            simplified: None,
            numeric_value: None,
            error: None,
        };

        let tree = match self.substrate.parse(&parsed.normalized) {
            Ok(tree) => tree,
            Err(e) => {
                inspection.error = Some(e.to_string());
                return inspection;
            }
        };
        inspection.parsed = Some(self.substrate.render(&tree));

        match self.substrate.simplify(&tree) {
            Ok(simplified) => {
                inspection.simplified = Some(self.substrate.render(&simplified));
                if self.substrate.is_constant(&simplified) {
                    match self.substrate.evaluate(&simplified) {
                        Ok(value) => inspection.numeric_value = Some(value),
                        Err(e) => inspection.error = Some(e.to_string()),
                    }
                }
            }
            Err(e) => inspection.error = Some(e.to_string()),
        }
        inspection
    }
}

/// Grade one answer with the default evaluator.
pub fn evaluate_answer(student_text: &str, expected_text: &str) -> EvaluationResult {
    MathEvaluator::default().evaluate_answer(student_text, expected_text)
}

/// Grade a step sequence with the default evaluator.
pub fn evaluate_steps<T: AsRef<str>>(
    steps: &[T],
    expected_answer: &str,
    expected_steps: Option<&[String]>,
) -> StepEvaluationSummary {
    MathEvaluator::default().evaluate_steps(steps, expected_answer, expected_steps)
}

/// Round to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Locale;
    use crate::model::ErrorKind;
    use crate::testing::FloatSubstrate;

    #[test]
    fn scenario_arithmetic() {
        let result = evaluate_answer("2+2", "4");
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
        assert!(result.hints.is_empty());
        assert_eq!(result.correct_answer, "4");
    }

    #[test]
    fn scenario_symbolic_expansion() {
        let result = evaluate_answer("x^2 + 2x + 1", "(x+1)^2");
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.correct_answer, "(x + 1)^2");
    }

    #[test]
    fn scenario_sign_error() {
        let result = evaluate_answer("-4", "4");
        assert!(!result.is_correct);
        assert_eq!(result.score, 0.70);
        assert!(result.classification.contains(ErrorKind::SignError));
        assert_eq!(result.hints[0], Locale::En.templates().sign_hint);
        assert_eq!(result.feedback, Locale::En.templates().buckets[2]);
    }

    #[test]
    fn scenario_product() {
        let result = evaluate_answer("2*5", "10");
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn scenario_garbage() {
        let result = evaluate_answer("%%%", "4");
        assert!(!result.is_correct);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.feedback, Locale::En.templates().invalid_expression);
        assert_eq!(result.hints, vec![Locale::En.templates().syntax_hint]);
        assert_eq!(result.correct_answer, "4");
        assert!(result.classification.is_empty());
    }

    #[test]
    fn unparsable_reference_is_echoed() {
        let result = evaluate_answer("4", "  4 +  ");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.correct_answer, "4 +");
    }

    #[test]
    fn every_valid_expression_matches_itself() {
        for text in [
            "0",
            "x",
            "-3/4",
            "2x + 3y - 1",
            "(a+b)^3",
            "sqrt(2)",
            "sin(x)^2",
            "1/(x-1)",
            "1/0",
            "pi*e",
            "oo",
        ] {
            let result = evaluate_answer(text, text);
            assert!(result.is_correct, "{text} should match itself");
            assert_eq!(result.score, 1.0);
            assert!(result.classification.is_empty());
        }
    }

    #[test]
    fn negated_constants_are_sign_errors() {
        for b in ["4", "2.5", "1/3", "-7", "pi", "sqrt(2)"] {
            let result = evaluate_answer(&format!("-({b})"), b);
            assert!(!result.is_correct, "{b}");
            assert_eq!(result.score, 0.70, "{b}");
            assert!(result.classification.contains(ErrorKind::SignError), "{b}");
        }
    }

    #[test]
    fn scores_stay_in_range() {
        let pairs = [
            ("x + 1", "x + 2"),
            ("a", "b"),
            ("1000", "1"),
            ("x", "1/(x-x)"),
            ("sqrt(-1)", "2"),
            ("2x + 1", "2(x+1)"),
            ("x+1", "(x+1)^2"),
        ];
        for (student, expected) in pairs {
            let result = evaluate_answer(student, expected);
            assert!((0.0..=1.0).contains(&result.score), "{student} vs {expected}");
            assert!(!result.is_correct || result.score == 1.0);
            assert!(result.hints.len() <= 3);
        }
    }

    #[test]
    fn answers_that_differ_for_negative_inputs_are_wrong() {
        for (student, expected) in [("abs(x)", "x"), ("sqrt(x^2)", "x"), ("x", "abs(x)")] {
            let result = evaluate_answer(student, expected);
            assert!(!result.is_correct, "{student} vs {expected}");
            assert!(result.score < 1.0, "{student} vs {expected}");
        }

        let result = evaluate_answer("x", "abs(x)^2");
        assert!(!result.classification.contains(ErrorKind::ExponentError));

        assert!(evaluate_answer("sqrt(x^2)", "abs(x)").is_correct);
    }

    #[test]
    fn adversarial_nesting_grades_as_invalid() {
        let nested = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        let minus_chain = format!("{}x", "-".repeat(200_000));
        let long_sum = vec!["1"; 20_000].join("+");

        for text in [&nested, &minus_chain, &long_sum] {
            let result = evaluate_answer(text, "x");
            assert!(!result.is_correct);
            assert_eq!(result.score, 0.0);
            assert_eq!(result.feedback, Locale::En.templates().invalid_expression);

            let result = evaluate_answer("x", text);
            assert_eq!(result.score, 0.0);
        }

        let summary = evaluate_steps(&[nested.as_str(), "x"], "x", None);
        assert_eq!(summary.step_results[0].score, 0.0);
        assert!(summary.step_results[1].is_correct);
        assert_eq!(summary.global_score, 0.5);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let a = evaluate_answer("2x + 2", "x + 1");
        let b = evaluate_answer("2x + 2", "x + 1");
        assert_eq!(a, b);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }

    #[test]
    fn unclassified_answers_get_generic_hints() {
        let result = evaluate_answer("x + 1", "x + 2");
        assert_eq!(result.score, 0.5);
        assert!(result.classification.is_empty());
        assert_eq!(result.hints.len(), 3);
        assert_eq!(result.feedback, Locale::En.templates().buckets[3]);
    }

    #[test]
    fn max_hints_caps_the_list() {
        let evaluator = MathEvaluator::new(EngineConfig {
            max_hints: 1,
            ..EngineConfig::default()
        });
        assert_eq!(evaluator.evaluate_answer("a", "b").hints.len(), 1);
    }

    #[test]
    fn expansion_limits_come_from_config() {
        let evaluator = MathEvaluator::new(EngineConfig {
            max_exponent: 8,
            ..EngineConfig::default()
        });
        assert_eq!(evaluator.substrate().limits().max_exponent, 8);
        assert_eq!(*evaluator.substrate().limits(), evaluator.config().limits());
    }

    #[test]
    fn normalized_input_is_graded() {
        assert!(evaluate_answer("2 × 3", "6").is_correct);
        assert!(evaluate_answer("x²", "x*x").is_correct);
        assert!(evaluate_answer("10 divided by 4", "2,5").is_correct);
        assert!(evaluate_answer("√16", "4").is_correct);
    }

    #[test]
    fn french_locale() {
        let evaluator = MathEvaluator::new(EngineConfig {
            locale: Locale::Fr,
            ..EngineConfig::default()
        });
        let result = evaluator.evaluate_answer("-4", "4");
        assert_eq!(result.hints[0], Locale::Fr.templates().sign_hint);
        assert!(evaluator.evaluate_answer("4", "4").feedback.starts_with("Parfait"));
    }

    #[test]
    fn explain_uses_result() {
        let evaluator = MathEvaluator::default();
        let correct = evaluator.explain(&evaluator.evaluate_answer("4", "4"));
        assert_eq!(correct.confidence, 0.85);
        assert_eq!(correct.steps.len(), 2);

        let wrong = evaluator.explain(&evaluator.evaluate_answer("-4", "4"));
        assert_eq!(wrong.confidence, 0.70);
        assert!(wrong.steps.last().unwrap().starts_with("Hint: "));
    }

    #[test]
    fn inspect_reports_each_stage() {
        let evaluator = MathEvaluator::default();
        let inspection = evaluator.inspect("(x+1)^2 - x^2");
        assert!(inspection.is_valid);
        assert_eq!(inspection.parsed.as_deref(), Some("(x + 1)^2 - x^2"));
        assert_eq!(inspection.simplified.as_deref(), Some("2*x + 1"));
        assert_eq!(inspection.numeric_value, None);

        let constant = evaluator.inspect("2^10");
        assert_eq!(constant.numeric_value, Some(1024.0));

        let broken = evaluator.inspect("2 +");
        assert!(!broken.is_valid);
        assert!(broken.error.is_some());

        let undefined = evaluator.inspect("1/0");
        assert!(undefined.is_valid);
        assert_eq!(undefined.error.as_deref(), Some("division by zero"));
    }

    #[test]
    fn engine_runs_on_a_numeric_substrate() {
        let evaluator = MathEvaluator::with_substrate(FloatSubstrate, EngineConfig::default());
        assert!(evaluator.evaluate_answer("2+2", "4").is_correct);

        let sign = evaluator.evaluate_answer("-4", "4");
        assert_eq!(sign.score, 0.70);
        assert!(sign.classification.contains(ErrorKind::SignError));

        let coefficient = evaluator.evaluate_answer("12", "4");
        assert_eq!(coefficient.score, 0.60);

        let near = evaluator.evaluate_answer("4.005", "4");
        assert_eq!(near.score, 0.95);

        assert_eq!(evaluator.evaluate_answer("x", "4").score, 0.0);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(0.666), 0.67);
        assert_eq!(round2(0.5), 0.5);
        assert_eq!(round2(0.0), 0.0);
    }
}
