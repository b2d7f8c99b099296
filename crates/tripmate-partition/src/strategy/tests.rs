use std::collections::BTreeSet;

use tripmate_core::Participant;
use tripmate_scoring::{ConflictDetector, TraitScorer};
use tripmate_test::{clustered_pool, random_pool};

use super::*;
use crate::balance::matches_plan;
use crate::objective::{is_complete, objective};

fn context(pool: &[Participant], target: usize) -> PartitionContext {
    PartitionContext::new(
        pool,
        &TraitScorer::default(),
        &ConflictDetector::default(),
        target,
        2.0,
        false,
    )
}

fn as_sets(clusters: &[Vec<usize>]) -> BTreeSet<BTreeSet<usize>> {
    clusters.iter().map(|g| g.iter().copied().collect()).collect()
}

fn true_clusters(clusters: usize, per_cluster: usize) -> BTreeSet<BTreeSet<usize>> {
    (0..clusters)
        .map(|c| (c * per_cluster..(c + 1) * per_cluster).collect())
        .collect()
}

fn assert_valid(ctx: &PartitionContext, clusters: &[Vec<usize>]) {
    assert!(is_complete(clusters, ctx.len()));
    let sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
    assert!(matches_plan(&sizes, ctx.plan()), "sizes {sizes:?}");
}

#[test]
fn test_centroid_recovers_separated_clusters() {
    let pool = clustered_pool(3, 4, 1);
    let ctx = context(&pool, 4);

    let output = CentroidStrategy::default().partition(&ctx, 7).unwrap();
    assert_valid(&ctx, &output.clusters);
    assert_eq!(as_sets(&output.clusters), true_clusters(3, 4));
    assert!(output.refinement.is_none());
}

#[test]
fn test_centroid_is_deterministic_per_seed() {
    let pool = random_pool(23, 4);
    let ctx = context(&pool, 5);
    let strategy = CentroidStrategy::default();

    let first = strategy.partition(&ctx, 99).unwrap();
    let second = strategy.partition(&ctx, 99).unwrap();
    assert_eq!(first, second);
    assert_valid(&ctx, &first.clusters);
}

#[test]
fn test_agglomerative_recovers_separated_clusters() {
    let pool = clustered_pool(3, 4, 2);
    let ctx = context(&pool, 4);

    let output = AgglomerativeStrategy::new().partition(&ctx, 0).unwrap();
    assert_valid(&ctx, &output.clusters);
    assert_eq!(as_sets(&output.clusters), true_clusters(3, 4));
}

#[test]
fn test_agglomerative_balances_remainders() {
    let pool = random_pool(13, 8);
    let ctx = context(&pool, 6);

    let output = AgglomerativeStrategy::new().partition(&ctx, 0).unwrap();
    assert_eq!(ctx.plan(), &[5, 4, 4]);
    assert_valid(&ctx, &output.clusters);
}

#[test]
fn test_rebalance_moves_members_to_plan() {
    let pool = random_pool(10, 6);
    let ctx = context(&pool, 5);

    let lopsided = vec![(0..8).collect(), vec![8, 9]];
    let balanced = rebalance(&ctx, lopsided).unwrap();
    assert_valid(&ctx, &balanced);
}

#[test]
fn test_rebalance_rejects_incomplete_input() {
    let pool = random_pool(10, 6);
    let ctx = context(&pool, 5);

    assert!(rebalance(&ctx, vec![(0..9).collect(), vec![]]).is_err());
    assert!(rebalance(&ctx, vec![(0..10).collect()]).is_err());
}

#[test]
fn test_hybrid_is_at_least_as_good_as_either_strategy() {
    let pool = random_pool(18, 21);
    let ctx = context(&pool, 6);

    let centroid = CentroidStrategy::default().partition(&ctx, 3).unwrap();
    let agglomerative = AgglomerativeStrategy::new().partition(&ctx, 3).unwrap();
    let hybrid = HybridStrategy::default().partition(&ctx, 3).unwrap();

    assert_valid(&ctx, &hybrid.clusters);
    let best_single = objective(&ctx, &centroid.clusters).max(objective(&ctx, &agglomerative.clusters));
    assert!(objective(&ctx, &hybrid.clusters) >= best_single - 1e-9);
    assert!(hybrid.refinement.is_some());
}
