//! Ordered strategy fallback.

use std::sync::Arc;

use tracing::warn;

use tripmate_config::{PartitionAlgorithm, PartitionConfig};
use tripmate_core::{Result, TripmateError};

use crate::balance::matches_plan;
use crate::context::PartitionContext;
use crate::error::StrategyFailure;
use crate::objective::is_complete;
use crate::strategy::{
    AgglomerativeStrategy, CentroidStrategy, HybridStrategy, PartitionStrategy, StrategyOutput,
};

/// Result of running a chain.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub output: StrategyOutput,
    pub algorithm: PartitionAlgorithm,
    /// True when a strategy other than the first one produced the result.
    pub degraded: bool,
}

/// Strategies tried in order until one yields a valid partition.
#[derive(Debug, Clone)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn PartitionStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Arc<dyn PartitionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for `algorithm`: the requested strategy first, then simpler ones.
    pub fn for_algorithm(algorithm: PartitionAlgorithm, config: &PartitionConfig) -> Self {
        let centroid = CentroidStrategy::new(config.max_centroid_iterations);
        let hybrid: Arc<dyn PartitionStrategy> = Arc::new(HybridStrategy::new(
            centroid.clone(),
            config.max_refinement_steps,
            config.refinement_time_limit(),
        ));
        let hierarchical: Arc<dyn PartitionStrategy> = Arc::new(AgglomerativeStrategy::new());
        let centroid: Arc<dyn PartitionStrategy> = Arc::new(centroid);

        let strategies = match algorithm {
            PartitionAlgorithm::Hybrid => vec![hybrid, hierarchical, centroid],
            PartitionAlgorithm::Hierarchical => vec![hierarchical, centroid],
            PartitionAlgorithm::Centroid => vec![centroid, hierarchical],
        };
        Self::new(strategies)
    }

    pub fn strategies(&self) -> &[Arc<dyn PartitionStrategy>] {
        &self.strategies
    }

    /// Runs strategies in order.
    ///
    /// # Errors
    ///
    /// Returns a computation error when every strategy failed.
    pub fn run(&self, ctx: &PartitionContext, seed: u64) -> Result<ChainOutcome> {
        let mut failures = Vec::with_capacity(self.strategies.len());
        for (position, strategy) in self.strategies.iter().enumerate() {
            if ctx.is_cancelled() {
                return Err(TripmateError::computation("partition cancelled"));
            }
            let attempt = strategy
                .partition(ctx, seed)
                .and_then(|output| validate(ctx, output));
            match attempt {
                Ok(output) => {
                    return Ok(ChainOutcome {
                        output,
                        algorithm: strategy.algorithm(),
                        degraded: position > 0,
                    });
                }
                Err(failure) => {
                    warn!(
                        event = "strategy_fallback",
                        strategy = strategy.name(),
                        error = %failure,
                        remaining = self.strategies.len() - position - 1,
                        degraded = true,
                    );
                    failures.push(format!("{}: {failure}", strategy.name()));
                }
            }
        }
        Err(TripmateError::computation(format!(
            "every partition strategy failed ({})",
            failures.join("; ")
        )))
    }
}

fn validate(ctx: &PartitionContext, output: StrategyOutput) -> std::result::Result<StrategyOutput, StrategyFailure> {
    if !is_complete(&output.clusters, ctx.len()) {
        return Err(StrategyFailure::InvalidPartition(
            "participants missing or duplicated".into(),
        ));
    }
    let sizes: Vec<usize> = output.clusters.iter().map(Vec::len).collect();
    if !matches_plan(&sizes, ctx.plan()) {
        return Err(StrategyFailure::InvalidPartition(format!(
            "group sizes {sizes:?} are unbalanced"
        )));
    }
    Ok(output)
}
