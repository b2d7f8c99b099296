use std::sync::Mutex;

use tripmate_config::{BatchConfig, CacheConfig, PartitionConfig};
use tripmate_scoring::TraitScorer;
use tripmate_test::raw_pool;

use super::*;
use crate::cache::ResultCache;
use crate::provider::InMemoryParticipantProvider;
use crate::queue::{JobId, JobKind, JobProgress};

fn executor(n: usize) -> (EngineJobExecutor, Vec<ParticipantId>) {
    let pool = raw_pool(n, 11);
    let ids = pool.iter().map(|(id, _)| id.clone()).collect();
    let provider: InMemoryParticipantProvider = pool.into_iter().collect();
    let orchestrator = BatchOrchestrator::new(
        Arc::new(provider),
        Arc::new(TraitScorer::default()),
        Arc::new(ResultCache::default()),
        BatchConfig::default(),
        CacheConfig::default(),
    );
    let partitioner = Partitioner::new(
        PartitionConfig::default(),
        TraitScorer::default(),
        ConflictDetector::default(),
    );
    let executor = EngineJobExecutor::new(
        orchestrator,
        Arc::new(partitioner),
        Arc::new(ConflictDetector::default()),
    );
    (executor, ids)
}

fn ctx(kind: JobKind) -> JobContext {
    JobContext::detached(kind)
}

#[tokio::test]
async fn test_bulk_job_reports_progress() {
    let (executor, ids) = executor(20);
    let seen: Arc<Mutex<Vec<JobProgress>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let ctx = JobContext {
        job_id: JobId::new(),
        kind: JobKind::BulkCompatibility,
        retry_count: 0,
        progress: ProgressReporter::new(move |p| sink.lock().unwrap().push(p)),
    };
    let payload = JobPayload::BulkCompatibility {
        participant_ids: ids,
        options: BatchOptions::default(),
    };

    let output = executor.execute(&payload, ctx).await.unwrap();

    let JobOutput::BulkCompatibility(result) = output else {
        panic!("expected a batch result");
    };
    assert_eq!(result.pair_count, 190);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.last().map(|p| p.percentage), Some(100.0));
    assert_eq!(seen[0].message.as_deref(), Some("intra phase"));
}

#[tokio::test]
async fn test_group_analysis_reports_conflicts_per_group() {
    let (executor, ids) = executor(12);
    let payload = JobPayload::GroupAnalysis {
        participant_ids: ids,
        options: PartitionOptions::default().with_seed(3),
    };

    let output = executor
        .execute(&payload, ctx(JobKind::GroupAnalysis))
        .await
        .unwrap();

    let JobOutput::GroupAnalysis(analysis) = output else {
        panic!("expected a group analysis");
    };
    assert_eq!(analysis.partition.group_sizes(), vec![6, 6]);
    assert_eq!(analysis.group_conflicts.len(), 2);
    assert!(analysis.group_conflicts.iter().all(|r| r.pair_count == 15));
}

#[tokio::test]
async fn test_algorithm_comparison_shares_one_seed() {
    let (executor, ids) = executor(14);
    let payload = JobPayload::AlgorithmComparison {
        participant_ids: ids,
        options: PartitionOptions::default().with_target_group_size(5),
        algorithms: Vec::new(),
    };

    let output = executor
        .execute(&payload, ctx(JobKind::AlgorithmComparison))
        .await
        .unwrap();

    let JobOutput::AlgorithmComparison(comparison) = output else {
        panic!("expected an algorithm comparison");
    };
    let requested: Vec<_> = comparison.runs.iter().map(|r| r.requested).collect();
    assert_eq!(requested, PartitionAlgorithm::ALL.to_vec());
    assert!(comparison.runs.iter().all(|r| r.group_sizes.iter().sum::<usize>() == 14));
    assert!(comparison.best().is_some());
}

#[tokio::test]
async fn test_cache_warm_counts_already_cached_sets() {
    let (executor, ids) = executor(9);
    let payload = JobPayload::CacheWarm {
        id_sets: vec![ids[..4].to_vec(), ids[4..].to_vec()],
        options: BatchOptions::default(),
    };

    let first = executor.execute(&payload, ctx(JobKind::CacheWarm)).await.unwrap();
    let second = executor.execute(&payload, ctx(JobKind::CacheWarm)).await.unwrap();

    assert_eq!(
        first,
        JobOutput::CacheWarm(CacheWarmReport {
            sets: 2,
            computed: 2,
            already_cached: 0,
        })
    );
    assert_eq!(
        second,
        JobOutput::CacheWarm(CacheWarmReport {
            sets: 2,
            computed: 0,
            already_cached: 2,
        })
    );
}

#[tokio::test]
async fn test_unknown_participant_is_rejected_without_retry() {
    let (executor, mut ids) = executor(4);
    ids.push(ParticipantId::new("ghost"));
    let payload = JobPayload::GroupAnalysis {
        participant_ids: ids,
        options: PartitionOptions::default(),
    };

    let err = executor
        .execute(&payload, ctx(JobKind::GroupAnalysis))
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("ghost"));
}
