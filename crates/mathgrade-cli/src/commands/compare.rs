//! The `mathgrade compare` command.

use std::path::PathBuf;

use anyhow::Result;

use mathgrade_core::report::GradeReport;

use super::check_format;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    check_format(&format, &["text", "json", "markdown", "md"])?;
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = GradeReport::load_json(&baseline_path)?;
    let current = GradeReport::load_json(&current_path)?;

    let drift = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", drift.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&drift)?);
        }
        _ => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                drift.regressions.len(),
                drift.improvements.len(),
                drift.unchanged
            );

            for (title, changes) in [
                ("Regressions", &drift.regressions),
                ("Improvements", &drift.improvements),
            ] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} {:.2} -> {:.2} ({:+.2})",
                        c.case_id, c.baseline_score, c.current_score, c.delta
                    );
                }
            }

            if drift.new_cases > 0 {
                println!("\n{} new case(s)", drift.new_cases);
            }
            if drift.removed_cases > 0 {
                println!("{} removed case(s)", drift.removed_cases);
            }
        }
    }

    if fail_on_regression && drift.has_regressions() {
        anyhow::bail!("{} regression(s) found", drift.regressions.len());
    }

    Ok(())
}
