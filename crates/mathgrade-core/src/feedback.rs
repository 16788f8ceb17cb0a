//! Feedback, hints, and explanations.
//!
//! All text comes from fixed per-locale template tables, so the same grade
//! always produces the same words.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{Classification, ErrorKind, EvaluationResult, Explanation};

/// Language of generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn templates(self) -> &'static Templates {
        match self {
            Locale::En => &ENGLISH,
            Locale::Fr => &FRENCH,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Fr => write!(f, "fr"),
        }
    }
}

impl FromStr for Locale {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "fr" | "french" | "français" => Ok(Locale::Fr),
            other => Err(EngineError::UnknownLocale(other.to_string())),
        }
    }
}

/// One locale's text.
#[derive(Debug)]
pub struct Templates {
    pub correct: &'static str,
    /// Score buckets, highest first: > 0.9, > 0.7, > 0.5, > 0.3, the rest.
    pub buckets: [&'static str; 5],
    pub invalid_expression: &'static str,
    pub syntax_hint: &'static str,
    pub sign_hint: &'static str,
    pub coefficient_hint: &'static str,
    pub parentheses_hint: &'static str,
    pub exponent_hint: &'static str,
    pub generic_hints: [&'static str; 3],
    pub step_hint: &'static str,
    pub correct_summary: &'static str,
    pub incorrect_summary: &'static str,
    pub correct_steps: [&'static str; 2],
    pub correction_steps: [&'static str; 4],
    pub hint_prefix: &'static str,
    pub solution_outline: [&'static str; 4],
    pub expected_answer_prefix: &'static str,
}

impl Templates {
    pub fn hint_for(&self, kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::SignError => self.sign_hint,
            ErrorKind::CoefficientError => self.coefficient_hint,
            ErrorKind::ParenthesesError => self.parentheses_hint,
            ErrorKind::ExponentError => self.exponent_hint,
        }
    }
}

static ENGLISH: Templates = Templates {
    correct: "Correct! Your answer matches the expected result.",
    buckets: [
        "Excellent! Your answer is almost perfect.",
        "Good work! You are very close to the solution.",
        "Almost! There is one small error left to fix.",
        "Careful, there is an error in your calculation.",
        "This shows a misunderstanding of the concept. Review the lesson.",
    ],
    invalid_expression: "Invalid mathematical expression.",
    syntax_hint: "Check the syntax of your answer.",
    sign_hint: "Check the sign (+/-) in front of your expression.",
    coefficient_hint: "Check the multiplicative factor (coefficient).",
    parentheses_hint: "Don't forget grouping: parentheses set the order of operations.",
    exponent_hint: "Check the exponent of your expression.",
    generic_hints: [
        "Re-check each step of your calculation.",
        "Try simplifying your expression step by step.",
        "Check the order of operations.",
    ],
    step_hint: "Check this step.",
    correct_summary: "Right answer! Your result is correct.",
    incorrect_summary: "Incorrect answer. Here is how to correct it step by step:",
    correct_steps: [
        "You applied the right method.",
        "Your final result matches the expected answer.",
    ],
    correction_steps: [
        "1) Take the expression again and simplify it.",
        "2) Check the order of operations (parentheses, powers, products).",
        "3) Compare your result with the expected solution.",
        "4) Fix the step where you went off track.",
    ],
    hint_prefix: "Hint: ",
    solution_outline: [
        "1) Rewrite the problem clearly.",
        "2) Isolate the unknown step by step.",
        "3) Simplify, paying attention to signs.",
        "4) Check the result by substituting it back.",
    ],
    expected_answer_prefix: "Expected answer: ",
};

static FRENCH: Templates = Templates {
    correct: "Parfait ! La réponse est correcte.",
    buckets: [
        "Excellent ! La réponse est presque parfaite.",
        "Bon travail ! Tu es très proche de la solution.",
        "Presque ! Il reste une petite erreur à corriger.",
        "Attention, il y a une erreur dans ton calcul.",
        "Il y a une incompréhension du concept. Revois la leçon.",
    ],
    invalid_expression: "Expression mathématique invalide.",
    syntax_hint: "Vérifie la syntaxe de ta réponse.",
    sign_hint: "Vérifie le signe (+/-) devant ton expression.",
    coefficient_hint: "Attention au coefficient multiplicatif.",
    parentheses_hint: "N'oublie pas les parenthèses pour les opérations prioritaires.",
    exponent_hint: "Vérifie la puissance (exposant) de ton expression.",
    generic_hints: [
        "Revérifie chaque étape de ton calcul.",
        "Essaie de simplifier ton expression étape par étape.",
        "Vérifie les règles de priorité des opérations.",
    ],
    step_hint: "Vérifie cette étape.",
    correct_summary: "Bonne réponse ! Ton résultat est correct.",
    incorrect_summary: "Réponse incorrecte. Voici la correction étape par étape :",
    correct_steps: [
        "Tu as appliqué la bonne méthode.",
        "Ton calcul final correspond à la réponse attendue.",
    ],
    correction_steps: [
        "1) Reprends l'expression et simplifie-la.",
        "2) Vérifie les priorités opératoires (parenthèses, puissances, multiplications).",
        "3) Compare ton résultat avec la solution attendue.",
        "4) Corrige l'étape où tu as divergé.",
    ],
    hint_prefix: "Indice : ",
    solution_outline: [
        "1) Réécris l'énoncé clairement.",
        "2) Isole l'inconnue étape par étape.",
        "3) Simplifie en faisant attention aux signes.",
        "4) Vérifie le résultat en remplaçant.",
    ],
    expected_answer_prefix: "Réponse attendue : ",
};

/// Feedback line for a non-correct score.
pub fn feedback_for(score: f64, templates: &Templates) -> &'static str {
    let bucket = if score > 0.9 {
        0
    } else if score > 0.7 {
        1
    } else if score > 0.5 {
        2
    } else if score > 0.3 {
        3
    } else {
        4
    };
    templates.buckets[bucket]
}

/// One hint per classified kind in priority order, or the generic hints
/// when nothing was classified. Truncated to `max_hints`.
pub fn hints_for(classification: &Classification, templates: &Templates, max_hints: usize) -> Vec<String> {
    let hints: Vec<&str> = if classification.is_empty() {
        templates.generic_hints.to_vec()
    } else {
        classification.iter().map(|kind| templates.hint_for(kind)).collect()
    };
    hints.into_iter().take(max_hints).map(str::to_string).collect()
}

/// Confidence reported with an explanation.
pub const CORRECT_CONFIDENCE: f64 = 0.85;
pub const INCORRECT_CONFIDENCE: f64 = 0.70;

/// A worked explanation for a graded answer.
pub fn explain(result: &EvaluationResult, templates: &Templates) -> Explanation {
    if result.is_correct {
        return Explanation {
            summary: templates.correct_summary.to_string(),
            steps: templates.correct_steps.iter().map(|s| s.to_string()).collect(),
            confidence: CORRECT_CONFIDENCE,
        };
    }

    let mut steps: Vec<String> = templates
        .correction_steps
        .iter()
        .map(|s| s.to_string())
        .collect();
    steps.extend(
        result
            .hints
            .iter()
            .map(|hint| format!("{}{hint}", templates.hint_prefix)),
    );
    Explanation {
        summary: templates.incorrect_summary.to_string(),
        steps,
        confidence: INCORRECT_CONFIDENCE,
    }
}
