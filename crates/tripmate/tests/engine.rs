//! End-to-end tests of the engine facade.

use std::sync::Arc;
use std::time::Duration;

use tripmate::prelude::*;
use tripmate::service::InMemoryResultStore;
use tripmate::{JobId, JobKind, JobOutput, JobPayload, JobStatus, ResultStore, Severity};
use tripmate_test::{clustered_pool, leaders, random_pool, raw_pool};

fn engine_with_pool(n: usize) -> (Engine, Vec<ParticipantId>) {
    let pool = raw_pool(n, 5);
    let ids = pool.iter().map(|(id, _)| id.clone()).collect();
    let engine = Engine::builder()
        .with_config(EngineConfig::new().with_random_seed(17))
        .with_participants(pool)
        .build()
        .unwrap();
    (engine, ids)
}

async fn wait_for_terminal(engine: &Engine, id: JobId) -> JobStatus {
    for _ in 0..1000 {
        if let Some(status) = engine.get_job_status(id) {
            if status.state.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish");
}

#[tokio::test]
async fn test_pairwise_scores_are_symmetric_and_bounded() {
    let (engine, _) = engine_with_pool(2);
    let pool = random_pool(10, 3);

    for a in &pool {
        assert!(engine.compute_compatibility(a, a).overall > 90.0);
        for b in &pool {
            let ab = engine.compute_compatibility(a, b);
            let ba = engine.compute_compatibility(b, a);
            assert_eq!(ab.overall, ba.overall);
            assert!((0.0..=100.0).contains(&ab.overall));
        }
    }
}

#[tokio::test]
async fn test_group_compatibility_and_conflicts() {
    let (engine, _) = engine_with_pool(2);
    let group = leaders(&[90.0, 85.0, 15.0]);

    let compatibility = engine.compute_group_compatibility(&group).unwrap();
    assert_eq!(compatibility.pair_count(), 3);

    let report = engine
        .detect_conflicts(&group, &ConflictOptions::default())
        .unwrap();
    assert_eq!(report.leadership.len(), 1);
    assert_eq!(report.leadership[0].severity, Severity::Critical);
    assert!(report.overall_risk > 0.5);
}

#[tokio::test]
async fn test_partition_twelve_into_two_groups_of_six() {
    let (engine, _) = engine_with_pool(2);
    let pool = clustered_pool(2, 6, 9);
    let options = engine.default_partition_options();

    let outcome = engine.partition_into_groups(&pool, &options).unwrap();

    assert_eq!(outcome.group_sizes(), vec![6, 6]);
    assert_eq!(outcome.seed, 17);
    assert!(!outcome.degraded);
}

#[tokio::test]
async fn test_partition_thirteen_places_everyone_once() {
    let (engine, _) = engine_with_pool(2);
    let pool = random_pool(13, 21);

    for algorithm in PartitionAlgorithm::ALL {
        let options = engine
            .default_partition_options()
            .with_algorithm(algorithm)
            .with_avoid_conflicts(true);
        let outcome = engine.partition_into_groups(&pool, &options).unwrap();

        let mut sizes = outcome.group_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 4, 5], "{algorithm}");
        for p in &pool {
            assert!(outcome.group_of(&p.id).is_some());
        }
        assert_eq!(sizes.iter().sum::<usize>(), 13);
    }
}

#[tokio::test]
async fn test_all_pairs_round_trips_through_cache() {
    let (engine, ids) = engine_with_pool(10);
    let options = BatchOptions::default();

    let first = engine.compute_all_pairs(&ids, &options).await.unwrap();
    let second = engine.compute_all_pairs(&ids, &options).await.unwrap();

    assert_eq!(first.pair_count, 45);
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.scores, first.scores);
    assert_eq!(engine.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_batch_job_completes_and_is_stored() {
    let pool = raw_pool(12, 8);
    let ids: Vec<ParticipantId> = pool.iter().map(|(id, _)| id.clone()).collect();
    let store = Arc::new(InMemoryResultStore::new());
    let engine = Engine::builder()
        .with_participants(pool)
        .with_store(store.clone() as Arc<dyn ResultStore>)
        .build()
        .unwrap();

    let receipt = engine
        .submit_batch_job(
            ids,
            BatchJobOptions::default()
                .with_priority(Priority::High)
                .with_matrix(true),
        )
        .unwrap();
    let status = wait_for_terminal(&engine, receipt.job_id).await;

    assert_eq!(status.state, JobState::Completed);
    assert_eq!(status.kind, JobKind::BulkCompatibility);
    let Some(JobOutput::BulkCompatibility(result)) = &status.result else {
        panic!("expected a batch result, got {:?}", status.result);
    };
    assert_eq!(result.pair_count, 66);
    assert!(result.matrix.as_ref().unwrap().is_symmetric());
    assert_eq!(store.get(receipt.job_id).as_ref(), status.result.as_ref());
}

#[tokio::test]
async fn test_invalid_batch_job_is_rejected_before_queueing() {
    let (engine, ids) = engine_with_pool(3);

    let err = engine
        .submit_batch_job(vec![ids[0].clone()], BatchJobOptions::default())
        .unwrap_err();
    assert!(matches!(err, TripmateError::Validation(_)));
}

#[tokio::test]
async fn test_group_analysis_job() {
    let (engine, ids) = engine_with_pool(12);
    let request = JobRequest::new(JobPayload::GroupAnalysis {
        participant_ids: ids,
        options: engine.default_partition_options(),
    });

    let receipt = engine.submit_job(request).unwrap();
    let status = wait_for_terminal(&engine, receipt.job_id).await;

    let Some(JobOutput::GroupAnalysis(analysis)) = status.result else {
        panic!("expected a group analysis, got {:?}", status.state);
    };
    assert_eq!(analysis.partition.group_sizes(), vec![6, 6]);
    assert_eq!(analysis.group_conflicts.len(), 2);
}

#[tokio::test]
async fn test_failing_job_reports_last_error() {
    let (engine, mut ids) = engine_with_pool(3);
    ids.push(ParticipantId::new("ghost"));
    let request = JobRequest::new(JobPayload::BulkCompatibility {
        participant_ids: ids,
        options: BatchOptions::default(),
    });

    let receipt = engine.submit_job(request).unwrap();
    let status = wait_for_terminal(&engine, receipt.job_id).await;

    assert_eq!(status.state, JobState::Failed);
    assert_eq!(status.retry_count, 0);
    assert!(status.error.unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_shutdown_closes_the_queue() {
    let (engine, ids) = engine_with_pool(4);

    assert!(!engine.cancel_job(JobId::new()));
    let report = engine.shutdown(Duration::from_secs(1)).await;
    assert_eq!(report.aborted, 0);

    let err = engine
        .submit_batch_job(ids, BatchJobOptions::default())
        .unwrap_err();
    assert!(matches!(err, TripmateError::QueueClosed));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = EngineConfig::new().with_worker_pool_size(0);
    let err = Engine::builder().with_config(config).build().unwrap_err();
    assert!(matches!(err, TripmateError::Config(_)));
}

#[test]
fn test_build_requires_a_runtime() {
    let err = Engine::builder().build().unwrap_err();
    assert!(err.to_string().contains("tokio runtime"));
}
