use std::collections::BTreeSet;
use std::sync::Arc;

use tripmate_core::{ParticipantId, TripmateError};
use tripmate_test::{clustered_pool, leaders, random_pool};

use super::*;

fn options(target: usize, algorithm: PartitionAlgorithm) -> PartitionOptions {
    PartitionOptions::default()
        .with_target_group_size(target)
        .with_algorithm(algorithm)
        .with_seed(42)
}

fn assert_complete(outcome: &PartitionOutcome, expected: &[ParticipantId]) {
    let mut seen: Vec<&ParticipantId> = outcome.groups.iter().flat_map(|g| &g.members).collect();
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total, "participant assigned twice");
    let expected: BTreeSet<&ParticipantId> = expected.iter().collect();
    assert_eq!(seen.into_iter().collect::<BTreeSet<_>>(), expected);
}

fn ids(pool: &[tripmate_core::Participant]) -> Vec<ParticipantId> {
    pool.iter().map(|p| p.id.clone()).collect()
}

#[test]
fn test_equal_split() {
    let pool = random_pool(12, 1);
    let outcome = Partitioner::default()
        .partition(&pool, &options(6, PartitionAlgorithm::Hybrid))
        .unwrap();

    assert_eq!(outcome.group_sizes(), vec![6, 6]);
    assert_complete(&outcome, &ids(&pool));
    assert_eq!(outcome.algorithm_used, PartitionAlgorithm::Hybrid);
    assert!(!outcome.degraded);
    assert!(outcome.refinement.is_some());
}

#[test]
fn test_remainder_split() {
    let pool = random_pool(13, 2);
    for algorithm in PartitionAlgorithm::ALL {
        let outcome = Partitioner::default()
            .partition(&pool, &options(6, algorithm))
            .unwrap();

        let mut sizes = outcome.group_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 4, 5], "{algorithm}");
        assert_complete(&outcome, &ids(&pool));
    }
}

#[test]
fn test_small_pool_forms_one_group() {
    let pool = random_pool(5, 3);
    let outcome = Partitioner::default()
        .partition(&pool, &options(6, PartitionAlgorithm::Hybrid))
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].len(), 5);
    assert!(outcome.refinement.is_none());
}

#[test]
fn test_completeness_across_sizes() {
    for (n, target) in [(2, 1), (7, 2), (20, 6), (31, 4), (40, 7)] {
        let pool = random_pool(n, n as u64);
        for algorithm in PartitionAlgorithm::ALL {
            let outcome = Partitioner::default()
                .partition(&pool, &options(target, algorithm))
                .unwrap();
            assert_complete(&outcome, &ids(&pool));
            let sizes = outcome.group_sizes();
            let max = sizes.iter().max().copied().unwrap_or(0);
            let min = sizes.iter().min().copied().unwrap_or(0);
            assert!(max - min <= 1, "n={n} target={target} sizes={sizes:?}");
        }
    }
}

#[test]
fn test_same_seed_same_groups() {
    let pool = random_pool(24, 5);
    let partitioner = Partitioner::default();
    for algorithm in PartitionAlgorithm::ALL {
        let first = partitioner.partition(&pool, &options(5, algorithm)).unwrap();
        let second = partitioner.partition(&pool, &options(5, algorithm)).unwrap();
        assert_eq!(first.groups, second.groups, "{algorithm}");
        assert_eq!(first.objective, second.objective);
    }
}

#[test]
fn test_generated_seed_is_recorded() {
    let pool = random_pool(18, 6);
    let partitioner = Partitioner::default();
    let unseeded = PartitionOptions::default().with_target_group_size(6);

    let first = partitioner.partition(&pool, &unseeded).unwrap();
    let replay = partitioner
        .partition(&pool, &unseeded.clone().with_seed(first.seed))
        .unwrap();
    assert_eq!(first.groups, replay.groups);
}

#[test]
fn test_clustered_pool_is_recovered() {
    let pool = clustered_pool(3, 5, 8);
    let outcome = Partitioner::default()
        .partition(&pool, &options(5, PartitionAlgorithm::Hybrid))
        .unwrap();

    for group in &outcome.groups {
        let clusters: BTreeSet<usize> = group
            .members
            .iter()
            .map(|id| pool.iter().position(|p| &p.id == id).unwrap() / 5)
            .collect();
        assert_eq!(clusters.len(), 1, "mixed group {:?}", group.members);
        assert!(group.aggregate_compatibility > 80.0);
    }
}

#[test]
fn test_avoid_conflicts_separates_strong_leaders() {
    let pool = leaders(&[95.0, 92.0, 10.0, 15.0]);
    let opts = options(2, PartitionAlgorithm::Hybrid).with_avoid_conflicts(true);
    let outcome = Partitioner::default().partition(&pool, &opts).unwrap();

    assert_eq!(outcome.groups.len(), 2);
    let a = outcome.group_of(&ParticipantId::new("leader0"));
    let b = outcome.group_of(&ParticipantId::new("leader1"));
    assert_ne!(a, b);
    assert!(outcome.groups.iter().all(|g| g.conflict_summary.critical == 0));
}

#[derive(Debug)]
struct FailingStrategy;

impl PartitionStrategy for FailingStrategy {
    fn algorithm(&self) -> PartitionAlgorithm {
        PartitionAlgorithm::Hybrid
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    fn partition(
        &self,
        _ctx: &PartitionContext,
        _seed: u64,
    ) -> Result<StrategyOutput, StrategyFailure> {
        Err(StrategyFailure::NonFinite("test"))
    }
}

/// Drops the last participant, which the chain must reject.
#[derive(Debug)]
struct LossyStrategy;

impl PartitionStrategy for LossyStrategy {
    fn algorithm(&self) -> PartitionAlgorithm {
        PartitionAlgorithm::Hierarchical
    }

    fn partition(
        &self,
        ctx: &PartitionContext,
        _seed: u64,
    ) -> Result<StrategyOutput, StrategyFailure> {
        let n = ctx.len();
        Ok(StrategyOutput::new(vec![(0..n / 2).collect(), (n / 2..n - 1).collect()]))
    }
}

#[test]
fn test_fallback_marks_outcome_degraded() {
    let pool = random_pool(12, 9);
    let partitioner = Partitioner::default().with_strategies(vec![
        Arc::new(FailingStrategy),
        Arc::new(LossyStrategy),
        Arc::new(CentroidStrategy::default()),
    ]);

    let outcome = partitioner
        .partition(&pool, &options(6, PartitionAlgorithm::Hybrid))
        .unwrap();
    assert!(outcome.degraded);
    assert_eq!(outcome.algorithm_used, PartitionAlgorithm::Centroid);
    assert_complete(&outcome, &ids(&pool));
}

#[test]
fn test_exhausted_chain_is_computation_error() {
    let pool = random_pool(12, 9);
    let partitioner =
        Partitioner::default().with_strategies(vec![Arc::new(FailingStrategy), Arc::new(LossyStrategy)]);

    let err = partitioner
        .partition(&pool, &options(6, PartitionAlgorithm::Hybrid))
        .unwrap_err();
    assert!(matches!(err, TripmateError::Computation(_)));
}

#[test]
fn test_invalid_input_is_rejected() {
    let pool = random_pool(4, 1);
    let partitioner = Partitioner::default();

    let err = partitioner
        .partition(&pool[..1], &options(6, PartitionAlgorithm::Hybrid))
        .unwrap_err();
    assert!(matches!(err, TripmateError::Validation(_)));

    let err = partitioner
        .partition(&pool, &options(0, PartitionAlgorithm::Hybrid))
        .unwrap_err();
    assert!(matches!(err, TripmateError::Validation(_)));
}

#[test]
fn test_default_chains() {
    let config = tripmate_config::PartitionConfig::default();
    let names = |algorithm| -> Vec<&'static str> {
        StrategyChain::for_algorithm(algorithm, &config)
            .strategies()
            .iter()
            .map(|s| s.name())
            .collect()
    };
    assert_eq!(
        names(PartitionAlgorithm::Hybrid),
        vec!["hybrid", "agglomerative", "centroid"]
    );
    assert_eq!(
        names(PartitionAlgorithm::Hierarchical),
        vec!["agglomerative", "centroid"]
    );
    assert_eq!(
        names(PartitionAlgorithm::Centroid),
        vec!["centroid", "agglomerative"]
    );
}

#[test]
fn test_dropped_guard_cancels_partition() {
    let pool = random_pool(24, 4);
    let flag = CancelFlag::new();
    drop(flag.cancel_on_drop());
    assert!(flag.is_cancelled());

    for algorithm in PartitionAlgorithm::ALL {
        let err = Partitioner::default()
            .partition_cancellable(&pool, &options(6, algorithm), &flag)
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"), "{algorithm}: {err}");
    }
}

#[test]
fn test_strategies_observe_cancellation() {
    let pool = random_pool(12, 5);
    let flag = CancelFlag::new();
    let ctx = PartitionContext::new(
        &pool,
        &tripmate_scoring::TraitScorer::default(),
        &tripmate_scoring::ConflictDetector::default(),
        4,
        2.0,
        false,
    )
    .with_cancel(flag.clone());

    assert!(CentroidStrategy::default().partition(&ctx, 1).is_ok());
    flag.cancel();
    assert_eq!(
        CentroidStrategy::default().partition(&ctx, 1).unwrap_err(),
        StrategyFailure::Cancelled
    );
    assert_eq!(
        AgglomerativeStrategy::new().partition(&ctx, 1).unwrap_err(),
        StrategyFailure::Cancelled
    );
    assert!(HybridStrategy::default().partition(&ctx, 1).is_err());
}
