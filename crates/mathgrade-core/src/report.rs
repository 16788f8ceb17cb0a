//! Grade reports with JSON persistence and drift detection.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::GradeSet;
use crate::results::CaseOutcome;
use crate::statistics::AggregateStats;

/// A complete batch grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub grade_set: GradeSetSummary,
    /// Outcomes sorted by case id.
    pub outcomes: Vec<CaseOutcome>,
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a grade set (without the full case definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSetSummary {
    pub id: String,
    pub name: String,
    pub case_count: usize,
}

impl From<&GradeSet> for GradeSetSummary {
    fn from(set: &GradeSet) -> Self {
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            case_count: set.case_count(),
        }
    }
}

impl GradeReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline. Score moves larger than
    /// `threshold` are reported; smaller ones count as unchanged.
    pub fn compare(&self, baseline: &GradeReport, threshold: f64) -> DriftReport {
        let score_map = |report: &GradeReport| -> BTreeMap<String, f64> {
            report
                .outcomes
                .iter()
                .map(|o| (o.case_id.clone(), o.score))
                .collect()
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut drift = DriftReport::default();
        for (case_id, &current) in &current_scores {
            let Some(&baseline_score) = baseline_scores.get(case_id) else {
                drift.new_cases += 1;
                continue;
            };
            let change = ScoreChange {
                case_id: case_id.clone(),
                baseline_score,
                current_score: current,
                delta: current - baseline_score,
            };
            if change.delta < -threshold {
                drift.regressions.push(change);
            } else if change.delta > threshold {
                drift.improvements.push(change);
            } else {
                drift.unchanged += 1;
            }
        }

        drift.removed_cases = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        drift
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftReport {
    /// Cases whose score went down.
    pub regressions: Vec<ScoreChange>,
    /// Cases whose score went up.
    pub improvements: Vec<ScoreChange>,
    /// Cases with no significant change.
    pub unchanged: usize,
    /// Cases in current but not baseline.
    pub new_cases: usize,
    /// Cases in baseline but not current.
    pub removed_cases: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub case_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl DriftReport {
    /// Format the drift report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged, {} new, {} removed\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged,
            self.new_cases,
            self.removed_cases
        );

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Case | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.2} | {:.2} | {:+.2} |\n",
                    c.case_id, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate_answer;
    use crate::model::AnswerCase;
    use crate::statistics::compute_aggregate_stats;

    fn outcome(id: &str, student: &str, expected: &str) -> CaseOutcome {
        let case = AnswerCase {
            id: id.into(),
            student: student.into(),
            expected: expected.into(),
            tags: vec![],
            expect: None,
        };
        CaseOutcome::from_answer(&case, evaluate_answer(student, expected))
    }

    fn make_report(outcomes: Vec<CaseOutcome>) -> GradeReport {
        GradeReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            grade_set: GradeSetSummary {
                id: "test".into(),
                name: "Test".into(),
                case_count: outcomes.len(),
            },
            aggregate: compute_aggregate_stats(&outcomes),
            outcomes,
            duration_ms: 0,
        }
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report(vec![outcome("c1", "2+2", "4")]);
        let current = make_report(vec![outcome("c1", "2+2", "4")]);

        let drift = current.compare(&baseline, 0.05);
        assert!(drift.regressions.is_empty());
        assert!(drift.improvements.is_empty());
        assert_eq!(drift.unchanged, 1);
    }

    #[test]
    fn compare_with_regression_and_improvement() {
        let baseline = make_report(vec![outcome("c1", "4", "4"), outcome("c2", "-4", "4")]);
        let current = make_report(vec![outcome("c1", "-4", "4"), outcome("c2", "4", "4")]);

        let drift = current.compare(&baseline, 0.05);
        assert_eq!(drift.regressions.len(), 1);
        assert_eq!(drift.regressions[0].case_id, "c1");
        assert!((drift.regressions[0].delta + 0.3).abs() < 1e-9);
        assert_eq!(drift.improvements.len(), 1);
        assert!(drift.has_regressions());
    }

    #[test]
    fn small_moves_are_unchanged() {
        let baseline = make_report(vec![outcome("c1", "-4", "4")]);
        let current = make_report(vec![outcome("c1", "4", "4")]);
        assert_eq!(current.compare(&baseline, 0.5).unchanged, 1);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report(vec![outcome("old", "1", "1")]);
        let current = make_report(vec![outcome("new", "1", "1")]);

        let drift = current.compare(&baseline, 0.05);
        assert_eq!(drift.new_cases, 1);
        assert_eq!(drift.removed_cases, 1);
        assert!(!drift.has_regressions());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![outcome("c1", "-4", "4")]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = GradeReport::load_json(&path).unwrap();

        assert_eq!(loaded.grade_set.id, "test");
        assert_eq!(loaded.outcomes, report.outcomes);
        assert_eq!(loaded.aggregate, report.aggregate);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(vec![outcome("c1", "4", "4")]);
        let current = make_report(vec![outcome("c1", "-4", "4")]);

        let md = current.compare(&baseline, 0.05).to_markdown();
        assert!(md.contains("### Regressions"));
        assert!(md.contains("| c1 | 1.00 | 0.70 | -0.30 |"));
    }
}
