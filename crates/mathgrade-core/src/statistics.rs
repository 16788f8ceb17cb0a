//! Aggregate statistics over a batch of case outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ErrorKind;
use crate::results::CaseOutcome;

/// Aggregate statistics across all outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    /// Mean of the case scores.
    pub mean_score: f64,
    /// Share of cases graded fully correct.
    pub accuracy: f64,
    /// Share of cases with expectations that met them all. `None` when no
    /// case declared any.
    pub expectation_pass_rate: Option<f64>,
    /// How often each error kind was classified.
    pub error_kinds: BTreeMap<ErrorKind, usize>,
    /// Per-tag statistics.
    pub per_tag: BTreeMap<String, TagStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagStats {
    pub cases: usize,
    pub mean_score: f64,
}

/// Compute aggregate statistics from all outcomes.
pub fn compute_aggregate_stats(outcomes: &[CaseOutcome]) -> AggregateStats {
    let total = outcomes.len();
    if total == 0 {
        return AggregateStats::default();
    }

    let mean_score = outcomes.iter().map(|o| o.score).sum::<f64>() / total as f64;
    let accuracy = outcomes.iter().filter(|o| o.is_correct).count() as f64 / total as f64;

    let with_expectation: Vec<&CaseOutcome> =
        outcomes.iter().filter(|o| o.has_expectation).collect();
    let expectation_pass_rate = (!with_expectation.is_empty()).then(|| {
        with_expectation.iter().filter(|o| o.passed()).count() as f64
            / with_expectation.len() as f64
    });

    let mut error_kinds = BTreeMap::new();
    for kind in outcomes.iter().flat_map(|o| o.classification.iter()) {
        *error_kinds.entry(kind).or_insert(0) += 1;
    }

    let mut tag_scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for outcome in outcomes {
        for tag in &outcome.tags {
            tag_scores.entry(tag.clone()).or_default().push(outcome.score);
        }
    }
    let per_tag = tag_scores
        .into_iter()
        .map(|(tag, scores)| {
            let stats = TagStats {
                cases: scores.len(),
                mean_score: scores.iter().sum::<f64>() / scores.len() as f64,
            };
            (tag, stats)
        })
        .collect();

    AggregateStats {
        total,
        mean_score,
        accuracy,
        expectation_pass_rate,
        error_kinds,
        per_tag,
    }
}
