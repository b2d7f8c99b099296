//! Size-capped average-linkage agglomerative clustering.

use tracing::trace;

use tripmate_config::PartitionAlgorithm;

use crate::context::PartitionContext;
use crate::error::StrategyFailure;
use crate::objective::Clusters;

use super::rebalance::rebalance;
use super::{PartitionStrategy, StrategyOutput};

/// Bottom-up clustering by average linkage.
///
/// Starts from singletons and repeatedly merges the two clusters with the
/// highest mean pair linkage whose merged size still fits the largest
/// planned group. When no merge fits, the two smallest clusters are merged.
/// The result is rebalanced onto the size plan.
#[derive(Debug, Clone, Default)]
pub struct AgglomerativeStrategy;

impl AgglomerativeStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionStrategy for AgglomerativeStrategy {
    fn algorithm(&self) -> PartitionAlgorithm {
        PartitionAlgorithm::Hierarchical
    }

    fn name(&self) -> &'static str {
        "agglomerative"
    }

    fn partition(&self, ctx: &PartitionContext, _seed: u64) -> Result<StrategyOutput, StrategyFailure> {
        let n = ctx.len();
        let k = ctx.group_count();
        if n == 0 || k == 0 {
            return Ok(StrategyOutput::new(Vec::new()));
        }
        let cap = ctx.max_group_size();

        let mut clusters: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
        // Summed linkage between live clusters, indexed by cluster slot.
        let mut links = vec![0.0; n * n];
        for i in 0..n {
            for j in i + 1..n {
                let l = ctx.linkage(i, j);
                if !l.is_finite() {
                    return Err(StrategyFailure::NonFinite("pair linkage"));
                }
                links[i * n + j] = l;
                links[j * n + i] = l;
            }
        }

        let mut live = n;
        while live > k {
            if ctx.is_cancelled() {
                return Err(StrategyFailure::Cancelled);
            }
            let (a, b) = best_merge(&clusters, &links, n, cap).unwrap_or_else(|| smallest_two(&clusters));
            let Some(absorbed) = clusters[b].take() else {
                return Err(StrategyFailure::InvalidPartition("merged an empty cluster".into()));
            };
            for c in 0..n {
                links[a * n + c] += links[b * n + c];
                links[c * n + a] = links[a * n + c];
            }
            if let Some(target) = clusters[a].as_mut() {
                target.extend(absorbed);
            }
            live -= 1;
            trace!(event = "cluster_merge", into = a, from = b, clusters = live);
        }

        let merged: Clusters = clusters.into_iter().flatten().collect();
        rebalance(ctx, merged).map(StrategyOutput::new)
    }
}

fn best_merge(
    clusters: &[Option<Vec<usize>>],
    links: &[f64],
    n: usize,
    cap: usize,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (a, ca) in clusters.iter().enumerate() {
        let Some(ca) = ca else { continue };
        for (b, cb) in clusters.iter().enumerate().skip(a + 1) {
            let Some(cb) = cb else { continue };
            if ca.len() + cb.len() > cap {
                continue;
            }
            let average = links[a * n + b] / (ca.len() * cb.len()) as f64;
            if best.map_or(true, |(_, _, l)| average > l) {
                best = Some((a, b, average));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

fn smallest_two(clusters: &[Option<Vec<usize>>]) -> (usize, usize) {
    let mut live: Vec<(usize, usize)> = clusters
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_ref().map(|c| (c.len(), i)))
        .collect();
    live.sort_unstable();
    let (x, y) = (live[0].1, live[1].1);
    (x.min(y), x.max(y))
}
