//! The `mathgrade grade` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{check_format, evaluator};

pub fn execute(
    student: String,
    expected: String,
    explain: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    check_format(&format, &["text", "json"])?;
    let evaluator = evaluator(config_path.as_deref())?;

    let result = evaluator.evaluate_answer(&student, &expected);
    let explanation = explain.then(|| evaluator.explain(&result));

    if format == "json" {
        let value = match &explanation {
            Some(explanation) => serde_json::json!({
                "result": result,
                "explanation": explanation,
            }),
            None => serde_json::to_value(&result)?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Correct: {}", if result.is_correct { "yes" } else { "no" });
    println!("Score: {:.2}", result.score);
    println!("Feedback: {}", result.feedback);
    if !result.is_correct {
        println!("Classification: {}", result.classification);
    }
    println!("Correct answer: {}", result.correct_answer);
    if !result.hints.is_empty() {
        println!("Hints:");
        for hint in &result.hints {
            println!("  - {hint}");
        }
    }

    if let Some(explanation) = explanation {
        println!("\n{}", explanation.summary);
        for step in &explanation.steps {
            println!("  {step}");
        }
        println!("Confidence: {:.2}", explanation.confidence);
    }

    Ok(())
}
