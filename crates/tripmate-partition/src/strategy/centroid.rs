//! Capacity-constrained centroid clustering.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use tripmate_config::PartitionAlgorithm;
use tripmate_core::TraitDimension;

use crate::context::{distance_sq, PartitionContext};
use crate::error::StrategyFailure;
use crate::objective::Clusters;

use super::{PartitionStrategy, StrategyOutput};

type Point = [f64; TraitDimension::COUNT];

/// Centroid clustering in trait space.
///
/// Centroids are seeded by farthest-point selection starting from a random
/// participant. Assignment is greedy over all (participant, centroid) pairs
/// in ascending distance order, where centroid `c` accepts at most
/// `plan[c]` members, so every iteration yields a balanced partition.
#[derive(Debug, Clone)]
pub struct CentroidStrategy {
    max_iterations: usize,
}

impl CentroidStrategy {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
        }
    }
}

impl Default for CentroidStrategy {
    fn default() -> Self {
        Self::new(50)
    }
}

impl PartitionStrategy for CentroidStrategy {
    fn algorithm(&self) -> PartitionAlgorithm {
        PartitionAlgorithm::Centroid
    }

    fn partition(&self, ctx: &PartitionContext, seed: u64) -> Result<StrategyOutput, StrategyFailure> {
        let n = ctx.len();
        let k = ctx.group_count();
        if n == 0 || k == 0 {
            return Ok(StrategyOutput::new(Vec::new()));
        }
        if (0..n).any(|i| ctx.vector(i).iter().any(|v| !v.is_finite())) {
            return Err(StrategyFailure::NonFinite("trait vectors"));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut centroids = farthest_point_seeds(ctx, k, rng.random_range(0..n));
        let mut assignment = assign(ctx, &centroids)?;

        for iteration in 1..self.max_iterations {
            if ctx.is_cancelled() {
                return Err(StrategyFailure::Cancelled);
            }
            centroids = recompute(ctx, &assignment, k);
            let next = assign(ctx, &centroids)?;
            if next == assignment {
                trace!(event = "centroid_converged", iteration);
                break;
            }
            assignment = next;
        }

        let mut clusters: Clusters = vec![Vec::new(); k];
        for (i, &c) in assignment.iter().enumerate() {
            clusters[c].push(i);
        }
        Ok(StrategyOutput::new(clusters))
    }
}

fn farthest_point_seeds(ctx: &PartitionContext, k: usize, first: usize) -> Vec<Point> {
    let n = ctx.len();
    let mut seeds = vec![*ctx.vector(first)];
    let mut nearest: Vec<f64> = (0..n)
        .map(|i| distance_sq(ctx.vector(i), ctx.vector(first)))
        .collect();

    while seeds.len() < k {
        let mut best = 0;
        for i in 1..n {
            if nearest[i] > nearest[best] {
                best = i;
            }
        }
        let seed = *ctx.vector(best);
        for (i, d) in nearest.iter_mut().enumerate() {
            *d = d.min(distance_sq(ctx.vector(i), &seed));
        }
        seeds.push(seed);
    }
    seeds
}

/// Greedy capacity-constrained assignment; returns a centroid per participant.
fn assign(ctx: &PartitionContext, centroids: &[Point]) -> Result<Vec<usize>, StrategyFailure> {
    let n = ctx.len();
    let mut candidates = Vec::with_capacity(n * centroids.len());
    for i in 0..n {
        for (c, centroid) in centroids.iter().enumerate() {
            let d = distance_sq(ctx.vector(i), centroid);
            if !d.is_finite() {
                return Err(StrategyFailure::NonFinite("centroid distance"));
            }
            candidates.push((d, i, c));
        }
    }
    candidates.sort_by(|x, y| {
        x.0.total_cmp(&y.0)
            .then(x.1.cmp(&y.1))
            .then(x.2.cmp(&y.2))
    });

    let mut capacity = ctx.plan().to_vec();
    let mut assignment: Vec<Option<usize>> = vec![None; n];
    let mut remaining = n;
    for (_, i, c) in candidates {
        if remaining == 0 {
            break;
        }
        if assignment[i].is_none() && capacity[c] > 0 {
            assignment[i] = Some(c);
            capacity[c] -= 1;
            remaining -= 1;
        }
    }

    assignment
        .into_iter()
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| StrategyFailure::InvalidPartition("participant left unassigned".into()))
}

fn recompute(ctx: &PartitionContext, assignment: &[usize], k: usize) -> Vec<Point> {
    let mut sums = vec![[0.0; TraitDimension::COUNT]; k];
    let mut counts = vec![0usize; k];
    for (i, &c) in assignment.iter().enumerate() {
        for (s, v) in sums[c].iter_mut().zip(ctx.vector(i)) {
            *s += v;
        }
        counts[c] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            let divisor = count.max(1) as f64;
            sum.map(|s| s / divisor)
        })
        .collect()
}
