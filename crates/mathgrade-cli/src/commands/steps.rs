//! The `mathgrade steps` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{check_format, evaluator};

pub fn execute(
    steps: Vec<String>,
    expected: String,
    expected_steps: Vec<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    check_format(&format, &["text", "json"])?;
    let evaluator = evaluator(config_path.as_deref())?;

    let reference = (!expected_steps.is_empty()).then_some(expected_steps.as_slice());
    let summary = evaluator.evaluate_steps(steps.as_slice(), &expected, reference);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Step", "Correct", "Score", "Hint", "Corrected"]);
    for step in &summary.step_results {
        table.add_row(vec![
            Cell::new(step.index + 1),
            Cell::new(&step.step_text),
            Cell::new(if step.is_correct { "yes" } else { "no" }),
            Cell::new(format!("{:.2}", step.score)),
            Cell::new(step.hint.as_deref().unwrap_or("")),
            Cell::new(step.corrected_step.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!("Global score: {:.2}", summary.global_score);

    println!("\nSolution:");
    for line in &summary.generated_solution {
        println!("  {line}");
    }

    Ok(())
}
