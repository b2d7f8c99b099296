//! Moves members until cluster sizes match the balance plan.

use crate::balance::matches_plan;
use crate::context::PartitionContext;
use crate::error::StrategyFailure;
use crate::objective::{is_complete, Clusters};

/// Reshapes `clusters` onto the context's size plan.
///
/// Clusters are matched to planned sizes largest first. While a cluster is
/// oversized, its member with the weakest mean linkage to the rest moves to
/// the undersized cluster it links to best.
pub fn rebalance(ctx: &PartitionContext, mut clusters: Clusters) -> Result<Clusters, StrategyFailure> {
    let plan = ctx.plan();
    if clusters.len() != plan.len() {
        return Err(StrategyFailure::InvalidPartition(format!(
            "expected {} clusters, found {}",
            plan.len(),
            clusters.len()
        )));
    }
    if !is_complete(&clusters, ctx.len()) {
        return Err(StrategyFailure::InvalidPartition(
            "clusters do not cover every participant exactly once".into(),
        ));
    }

    clusters.sort_by(|a, b| b.len().cmp(&a.len()));

    while let Some(from) = (0..clusters.len()).find(|&g| clusters[g].len() > plan[g]) {
        let slot = weakest_member(ctx, &clusters[from]);
        let member = clusters[from][slot];

        let to = (0..clusters.len())
            .filter(|&g| clusters[g].len() < plan[g])
            .map(|g| (g, mean_linkage(ctx, member, &clusters[g])))
            .fold(None::<(usize, f64)>, |best, (g, l)| match best {
                Some((_, bl)) if bl >= l => best,
                _ => Some((g, l)),
            })
            .map(|(g, _)| g)
            .ok_or_else(|| StrategyFailure::InvalidPartition("no undersized cluster".into()))?;

        clusters[from].swap_remove(slot);
        clusters[to].push(member);
    }

    let sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
    if !matches_plan(&sizes, plan) {
        return Err(StrategyFailure::InvalidPartition(format!(
            "sizes {sizes:?} do not match plan {plan:?}"
        )));
    }
    Ok(clusters)
}

fn weakest_member(ctx: &PartitionContext, members: &[usize]) -> usize {
    let mut weakest = 0;
    let mut weakest_linkage = f64::INFINITY;
    for (slot, &m) in members.iter().enumerate() {
        let l = mean_linkage(ctx, m, members);
        if l < weakest_linkage {
            weakest = slot;
            weakest_linkage = l;
        }
    }
    weakest
}

fn mean_linkage(ctx: &PartitionContext, member: usize, members: &[usize]) -> f64 {
    let others: Vec<f64> = members
        .iter()
        .filter(|&&m| m != member)
        .map(|&m| ctx.linkage(member, m))
        .collect();
    if others.is_empty() {
        return 0.0;
    }
    others.iter().sum::<f64>() / others.len() as f64
}
