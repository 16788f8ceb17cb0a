//! Batch grading of whole grade sets.
//!
//! Cases are graded concurrently with bounded parallelism. Each evaluation
//! is CPU-bound, so it runs on tokio's blocking pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::engine::MathEvaluator;
use crate::model::GradeSet;
use crate::report::{GradeReport, GradeSetSummary};
use crate::results::CaseOutcome;
use crate::statistics::compute_aggregate_stats;
use crate::substrate::ExactSubstrate;
use crate::traits::SymbolicSubstrate;

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_case_start(&self, case_id: &str);
    fn on_case_complete(&self, outcome: &CaseOutcome);
    fn on_case_error(&self, case_id: &str, error: &str);
    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_case_start(&self, _: &str) {}
    fn on_case_complete(&self, _: &CaseOutcome) {}
    fn on_case_error(&self, _: &str, _: &str) {}
    fn on_set_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

enum Job {
    Answer(usize),
    Steps(usize),
}

/// Grades every case of a grade set.
pub struct BatchRunner<S = ExactSubstrate> {
    evaluator: Arc<MathEvaluator<S>>,
    parallelism: usize,
}

impl<S> BatchRunner<S>
where
    S: SymbolicSubstrate + 'static,
{
    pub fn new(evaluator: MathEvaluator<S>, parallelism: usize) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            parallelism: parallelism.max(1),
        }
    }

    /// Grade every case of `set`. Outcomes are sorted by case id.
    pub async fn run(&self, set: &GradeSet, progress: &dyn ProgressReporter) -> Result<GradeReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let set = Arc::new(set.clone());
        let semaphore = Arc::new(Semaphore::new(self.parallelism));

        tracing::info!(
            run_id = %run_id,
            grade_set = %set.id,
            cases = set.case_count(),
            parallelism = self.parallelism,
            "starting batch run"
        );

        let jobs = (0..set.cases.len())
            .map(Job::Answer)
            .chain((0..set.step_cases.len()).map(Job::Steps));

        let mut futures = FuturesUnordered::new();
        for job in jobs {
            let evaluator = Arc::clone(&self.evaluator);
            let semaphore = Arc::clone(&semaphore);
            let set = Arc::clone(&set);
            let case_id = match job {
                Job::Answer(i) => set.cases[i].id.clone(),
                Job::Steps(i) => set.step_cases[i].id.clone(),
            };
            progress.on_case_start(&case_id);

            futures.push(async move {
                let graded = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let outcome = tokio::task::spawn_blocking(move || match job {
                        Job::Answer(i) => {
                            let case = &set.cases[i];
                            let result = evaluator.evaluate_answer(&case.student, &case.expected);
                            CaseOutcome::from_answer(case, result)
                        }
                        Job::Steps(i) => {
                            let case = &set.step_cases[i];
                            let summary = evaluator.evaluate_steps(
                                case.steps.as_slice(),
                                &case.expected,
                                case.expected_steps.as_deref(),
                            );
                            CaseOutcome::from_steps(case, summary)
                        }
                    })
                    .await?;
                    anyhow::Ok(outcome)
                };
                (case_id, graded.await)
            });
        }

        let total = futures.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut failed = 0usize;
        while let Some((case_id, result)) = futures.next().await {
            match result {
                Ok(outcome) => {
                    progress.on_case_complete(&outcome);
                    outcomes.push(outcome);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("case {case_id} failed: {e:#}");
                    progress.on_case_error(&case_id, &format!("{e:#}"));
                }
            }
        }

        outcomes.sort_by(|a, b| a.case_id.cmp(&b.case_id));
        let elapsed = start.elapsed();
        progress.on_set_complete(total, outcomes.len(), failed, elapsed);

        let aggregate = compute_aggregate_stats(&outcomes);
        tracing::info!(
            run_id = %run_id,
            graded = outcomes.len(),
            failed,
            mean_score = aggregate.mean_score,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch run finished"
        );

        Ok(GradeReport {
            id: run_id,
            created_at: Utc::now(),
            grade_set: GradeSetSummary::from(set.as_ref()),
            outcomes,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
