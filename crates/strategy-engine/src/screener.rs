use crate::{StockEvaluation, StrategyEngine};
use analysis_core::InstrumentSnapshot;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub total_analyzed: usize,
    pub total_recommended: usize,
    pub valid_data: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenOutcome {
    /// Every evaluated instrument, best first
    pub evaluations: Vec<StockEvaluation>,
    pub recommended: Vec<StockEvaluation>,
    pub summary: ScreenSummary,
}

/// Keep evaluations scoring at least `min_score`, at most `max_count` of them.
/// Input is expected to be sorted best first.
pub fn filter_recommendations(
    evaluations: &[StockEvaluation],
    min_score: f64,
    max_count: usize,
) -> Vec<StockEvaluation> {
    evaluations
        .iter()
        .filter(|e| e.total_score >= min_score)
        .take(max_count)
        .cloned()
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl StrategyEngine {
    /// Evaluate every snapshot independently and sort best first.
    ///
    /// Instruments that fail or panic are logged and left out; ties keep
    /// their input order.
    pub fn evaluate_batch(&self, snapshots: &[InstrumentSnapshot]) -> Vec<StockEvaluation> {
        let results: Vec<Option<StockEvaluation>> = snapshots
            .par_iter()
            .map(|snapshot| match panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(snapshot))) {
                Ok(Ok(evaluation)) => Some(evaluation),
                Ok(Err(e)) => {
                    error!(symbol = %snapshot.symbol, error = %e, "Excluding instrument from batch");
                    None
                }
                Err(payload) => {
                    error!(
                        symbol = %snapshot.symbol,
                        error = %panic_message(payload.as_ref()),
                        "Instrument evaluation panicked, excluding from batch"
                    );
                    None
                }
            })
            .collect();

        let mut evaluations: Vec<StockEvaluation> = results.into_iter().flatten().collect();

        // Sort by total score (highest first)
        evaluations.sort_by(|a, b| b.total_score.partial_cmp(&a.total_score).unwrap_or(Ordering::Equal));
        evaluations
    }

    pub fn filter_recommendations(&self, evaluations: &[StockEvaluation]) -> Vec<StockEvaluation> {
        filter_recommendations(evaluations, self.min_score(), self.max_count())
    }

    /// Full screen: evaluate, rank, filter, summarise
    pub fn screen(&self, snapshots: &[InstrumentSnapshot]) -> ScreenOutcome {
        info!("Starting screen of {} instruments", snapshots.len());

        let valid_data = snapshots.iter().filter(|s| s.is_valid()).count();
        let evaluations = self.evaluate_batch(snapshots);
        let recommended = self.filter_recommendations(&evaluations);

        info!(
            analyzed = evaluations.len(),
            recommended = recommended.len(),
            valid_data,
            "Screen complete"
        );

        let summary = ScreenSummary {
            total_analyzed: evaluations.len(),
            total_recommended: recommended.len(),
            valid_data,
            timestamp: Utc::now(),
        };

        ScreenOutcome {
            evaluations,
            recommended,
            summary,
        }
    }
}
