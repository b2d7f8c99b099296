//! Best-of-both clustering followed by swap refinement.

use std::time::Duration;

use tracing::debug;

use tripmate_config::PartitionAlgorithm;

use crate::context::PartitionContext;
use crate::error::StrategyFailure;
use crate::local_search::{ExternalTermination, RefinementStop, SwapLocalSearch};
use crate::objective::objective;

use super::{AgglomerativeStrategy, CentroidStrategy, PartitionStrategy, StrategyOutput};

/// Runs centroid and agglomerative clustering, keeps the partition with the
/// higher objective and refines it with hill-climbing swaps.
#[derive(Debug, Clone)]
pub struct HybridStrategy {
    centroid: CentroidStrategy,
    agglomerative: AgglomerativeStrategy,
    max_refinement_steps: u64,
    refinement_time_limit: Option<Duration>,
}

impl HybridStrategy {
    pub fn new(
        centroid: CentroidStrategy,
        max_refinement_steps: u64,
        refinement_time_limit: Option<Duration>,
    ) -> Self {
        Self {
            centroid,
            agglomerative: AgglomerativeStrategy::new(),
            max_refinement_steps,
            refinement_time_limit,
        }
    }
}

impl Default for HybridStrategy {
    fn default() -> Self {
        Self::new(CentroidStrategy::default(), 200, None)
    }
}

impl PartitionStrategy for HybridStrategy {
    fn algorithm(&self) -> PartitionAlgorithm {
        PartitionAlgorithm::Hybrid
    }

    fn partition(&self, ctx: &PartitionContext, seed: u64) -> Result<StrategyOutput, StrategyFailure> {
        let candidates = [
            self.centroid.partition(ctx, seed),
            self.agglomerative.partition(ctx, seed),
        ];

        let mut best: Option<(StrategyOutput, f64)> = None;
        let mut failures = Vec::new();
        for candidate in candidates {
            match candidate {
                Ok(output) => {
                    let value = objective(ctx, &output.clusters);
                    if !value.is_finite() {
                        failures.push(StrategyFailure::NonFinite("objective").to_string());
                        continue;
                    }
                    if best.as_ref().map_or(true, |(_, b)| value > *b) {
                        best = Some((output, value));
                    }
                }
                Err(failure) => failures.push(failure.to_string()),
            }
        }

        let Some((start, start_objective)) = best else {
            return Err(StrategyFailure::NoCandidate(failures.join("; ")));
        };
        debug!(
            event = "hybrid_candidate",
            objective = start_objective,
            failed_candidates = failures.len(),
        );

        let (clusters, stats) =
            SwapLocalSearch::hill_climbing(self.max_refinement_steps, self.refinement_time_limit)
                .with_termination(ExternalTermination::new(ctx.cancel_flag().clone()))
                .run(ctx, start.clusters);
        if stats.stop == RefinementStop::Cancelled {
            return Err(StrategyFailure::Cancelled);
        }
        Ok(StrategyOutput {
            clusters,
            refinement: Some(stats),
        })
    }
}
