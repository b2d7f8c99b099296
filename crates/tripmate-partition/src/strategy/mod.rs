//! Partition strategies.

mod agglomerative;
mod centroid;
mod hybrid;
mod rebalance;

use std::fmt::Debug;

use tripmate_config::PartitionAlgorithm;

use crate::context::PartitionContext;
use crate::error::StrategyFailure;
use crate::local_search::RefinementStats;
use crate::objective::Clusters;

pub use agglomerative::AgglomerativeStrategy;
pub use centroid::CentroidStrategy;
pub use hybrid::HybridStrategy;
pub use rebalance::rebalance;

/// Clusters produced by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub clusters: Clusters,
    pub refinement: Option<RefinementStats>,
}

impl StrategyOutput {
    pub fn new(clusters: Clusters) -> Self {
        Self {
            clusters,
            refinement: None,
        }
    }
}

/// One way of splitting participants into balanced groups.
///
/// Strategies are deterministic given the context and seed. They report
/// problems as [`StrategyFailure`] instead of panicking so that a chain can
/// fall back to the next strategy.
pub trait PartitionStrategy: Send + Sync + Debug {
    /// Algorithm reported on the outcome when this strategy wins.
    fn algorithm(&self) -> PartitionAlgorithm;

    fn name(&self) -> &'static str {
        self.algorithm().name()
    }

    fn partition(&self, ctx: &PartitionContext, seed: u64) -> Result<StrategyOutput, StrategyFailure>;
}

#[cfg(test)]
mod tests;
