//! Tests for engine configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [scoring]
        age_soft_threshold = 10.0

        [conflict.energy]
        minor = 30.0
        major = 45.0
        critical = 60.0

        [partition]
        target_group_size = 5
        algorithm = "centroid"
        avoid_conflicts = true
        random_seed = 42

        [batch]
        max_concurrency = 4

        [queue]
        worker_pool_size = 5
        max_retries = 1

        [queue.timeouts]
        group_analysis_ms = 1000

        [cache]
        base_ttl_secs = 60
    "#;

    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.scoring.age_soft_threshold, 10.0);
    assert_eq!(config.scoring.strong_leader_threshold, 75.0);
    assert_eq!(config.conflict.energy.major, 45.0);
    assert_eq!(config.conflict.risk, ConflictConfig::default().risk);
    assert_eq!(config.partition.algorithm, PartitionAlgorithm::Centroid);
    assert!(config.partition.avoid_conflicts);
    assert_eq!(config.partition.random_seed, Some(42));
    assert_eq!(config.batch.max_concurrency, 4);
    assert_eq!(config.batch.direct_pair_limit, 50);
    assert_eq!(config.queue.worker_pool_size, 5);
    assert_eq!(config.queue.timeouts.group_analysis_ms, 1000);
    assert_eq!(config.queue.timeouts.bulk_compatibility_ms, 300_000);
    assert_eq!(config.cache.base_ttl_secs, 60);
    config.validate().unwrap();
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        partition:
          target_group_size: 4
          algorithm: hybrid
          random_seed: 7
        queue:
          worker_pool_size: 2
          base_backoff_ms: 50
          max_finished_jobs: 10
    "#;

    let config = EngineConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.partition.target_group_size, 4);
    assert_eq!(config.partition.random_seed, Some(7));
    assert_eq!(config.queue.base_backoff(), Duration::from_millis(50));
    assert_eq!(config.queue.max_finished_jobs, 10);
    assert_eq!(config.queue.retain_finished(), Duration::from_secs(3600));
}

#[test]
fn test_empty_toml_is_default() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_negative_group_size_is_rejected() {
    let result = EngineConfig::from_toml_str(
        r#"
        [partition]
        target_group_size = -3
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_builder() {
    let config = EngineConfig::new()
        .with_random_seed(123)
        .with_target_group_size(4)
        .with_algorithm(PartitionAlgorithm::Hierarchical)
        .with_worker_pool_size(8)
        .with_max_retries(0);

    assert_eq!(config.partition.random_seed, Some(123));
    assert_eq!(config.partition.target_group_size, 4);
    assert_eq!(config.partition.algorithm, PartitionAlgorithm::Hierarchical);
    assert_eq!(config.queue.worker_pool_size, 8);
    assert_eq!(config.queue.max_retries, 0);
}

#[test]
fn test_validate_rejects_small_group_size() {
    let config = EngineConfig::new().with_target_group_size(1);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validate_rejects_zero_workers() {
    let config = EngineConfig::new().with_worker_pool_size(0);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("worker_pool_size"));
}

#[test]
fn test_validate_rejects_unordered_thresholds() {
    let mut config = EngineConfig::new();
    config.conflict.risk = SeverityThresholds::new(80.0, 65.0, 50.0);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("conflict.risk"));
}

#[test]
fn test_algorithm_from_str() {
    assert_eq!(
        "k-means".parse::<PartitionAlgorithm>().unwrap(),
        PartitionAlgorithm::Centroid
    );
    assert_eq!(
        "Agglomerative".parse::<PartitionAlgorithm>().unwrap(),
        PartitionAlgorithm::Hierarchical
    );
    assert!("genetic".parse::<PartitionAlgorithm>().is_err());
}

#[test]
fn test_penalty_weight_depends_on_avoid_conflicts() {
    let partition = PartitionConfig::default();
    assert_eq!(partition.penalty_weight(true), 15.0);
    assert_eq!(partition.penalty_weight(false), 2.0);
}

#[test]
fn test_ttl_scales_with_batch_size() {
    let cache = CacheConfig::default();
    let small = cache.ttl_for_batch(5);
    let medium = cache.ttl_for_batch(60);
    let large = cache.ttl_for_batch(400);
    assert!(small < medium);
    assert!(medium < large);
    assert!(large <= Duration::from_secs(cache.max_ttl_secs));
}
