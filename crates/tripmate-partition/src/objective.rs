//! Partition objective.
//!
//! objective = Σ_g |g| · mean_g / n − w · Σ_g penalty_g
//!
//! where `mean_g` is the mean pairwise score inside group `g` (neutral for a
//! singleton) and `penalty_g` the summed conflict weight of its pairs.

use tripmate_core::NEUTRAL_SCORE;

use crate::context::PartitionContext;

/// Groups as lists of participant indices.
pub type Clusters = Vec<Vec<usize>>;

/// Sum of pairwise scores inside `members`.
pub fn group_score_sum(ctx: &PartitionContext, members: &[usize]) -> f64 {
    pair_sum(members, |i, j| ctx.score(i, j))
}

/// Sum of pairwise conflict penalties inside `members`.
pub fn group_penalty(ctx: &PartitionContext, members: &[usize]) -> f64 {
    pair_sum(members, |i, j| ctx.penalty(i, j))
}

/// Mean pairwise score of `members`; neutral for fewer than two.
pub fn group_mean(ctx: &PartitionContext, members: &[usize]) -> f64 {
    let m = members.len();
    if m < 2 {
        return NEUTRAL_SCORE;
    }
    group_score_sum(ctx, members) / pair_count(m)
}

/// Objective of a full partition. Higher is better.
pub fn objective(ctx: &PartitionContext, clusters: &[Vec<usize>]) -> f64 {
    let n = ctx.len();
    if n == 0 {
        return 0.0;
    }
    let weighted: f64 = clusters
        .iter()
        .map(|g| g.len() as f64 * group_mean(ctx, g))
        .sum();
    let penalty: f64 = clusters.iter().map(|g| group_penalty(ctx, g)).sum();
    weighted / n as f64 - ctx.penalty_weight() * penalty
}

pub(crate) fn pair_count(m: usize) -> f64 {
    (m * m.saturating_sub(1)) as f64 / 2.0
}

fn pair_sum(members: &[usize], f: impl Fn(usize, usize) -> f64) -> f64 {
    let mut total = 0.0;
    for (x, &i) in members.iter().enumerate() {
        for &j in &members[x + 1..] {
            total += f(i, j);
        }
    }
    total
}

/// True when `clusters` covers `0..n` exactly once.
pub fn is_complete(clusters: &[Vec<usize>], n: usize) -> bool {
    let mut seen = vec![false; n];
    for &i in clusters.iter().flatten() {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    seen.into_iter().all(|s| s)
}
