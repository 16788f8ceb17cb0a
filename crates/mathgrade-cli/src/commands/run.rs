//! The `mathgrade run` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mathgrade_core::batch::{BatchRunner, ProgressReporter};
use mathgrade_core::config::load_config_from;
use mathgrade_core::parser::load_grade_sets;
use mathgrade_core::report::GradeReport;
use mathgrade_core::results::CaseOutcome;
use mathgrade_core::MathEvaluator;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_case_start(&self, _: &str) {}

    fn on_case_complete(&self, outcome: &CaseOutcome) {
        let status = if outcome.failures.is_empty() { "OK" } else { "MISMATCH" };
        eprintln!("  Done: {} [{status}] score {:.2}", outcome.case_id, outcome.score);
    }

    fn on_case_error(&self, case_id: &str, error: &str) {
        eprintln!("  ERROR: {case_id}: {error}");
    }

    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.2}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    grade_set_path: PathBuf,
    parallelism: Option<usize>,
    output: PathBuf,
    filter: Option<String>,
    fail_on_mismatch: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let mut grade_sets = load_grade_sets(&grade_set_path)?;
    if let Some(pattern) = &filter {
        grade_sets = grade_sets.iter().map(|set| set.filtered(pattern)).collect();
        tracing::debug!(pattern = %pattern, "filtered grade sets");
    }

    let runner = BatchRunner::new(MathEvaluator::new(config), parallelism);
    let reporter = ConsoleReporter;
    let mut mismatches = 0usize;

    for grade_set in &grade_sets {
        eprintln!(
            "mathgrade v{}: grading {} cases from {}",
            env!("CARGO_PKG_VERSION"),
            grade_set.case_count(),
            grade_set.name
        );

        let report = runner.run(grade_set, &reporter).await?;
        print_summary(&report);
        mismatches += report
            .outcomes
            .iter()
            .filter(|o| !o.failures.is_empty())
            .count();

        std::fs::create_dir_all(&output)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = output.join(format!("report-{}-{timestamp}.json", grade_set.id));
        report.save_json(&path)?;
        tracing::debug!(report_id = %report.id, path = %path.display(), "saved report");
        eprintln!("Results saved to: {}", path.display());
    }

    if fail_on_mismatch && mismatches > 0 {
        anyhow::bail!("{mismatches} case(s) missed their expectations");
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    let mut table = Table::new();
    table.set_header(vec!["Case", "Kind", "Score", "Correct", "Classification", "Expectations"]);

    for outcome in &report.outcomes {
        let expectations = if !outcome.has_expectation {
            "-".to_string()
        } else if outcome.failures.is_empty() {
            "met".to_string()
        } else {
            outcome.failures.join("; ")
        };
        table.add_row(vec![
            Cell::new(&outcome.case_id),
            Cell::new(format!("{:?}", outcome.kind).to_lowercase()),
            Cell::new(format!("{:.2}", outcome.score)),
            Cell::new(if outcome.is_correct { "yes" } else { "no" }),
            Cell::new(&outcome.classification),
            Cell::new(expectations),
        ]);
    }
    eprintln!("\n{table}");

    let stats = &report.aggregate;
    eprintln!(
        "Mean score: {:.2}  Accuracy: {:.1}%",
        stats.mean_score,
        stats.accuracy * 100.0
    );
    if let Some(rate) = stats.expectation_pass_rate {
        eprintln!("Expectations met: {:.1}%", rate * 100.0);
    }
    for (kind, count) in &stats.error_kinds {
        eprintln!("  {kind}: {count}");
    }
}
