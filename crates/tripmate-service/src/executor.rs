//! Job executor backed by the compatibility engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::task;
use tracing::debug;

use tripmate_config::PartitionAlgorithm;
use tripmate_core::{Participant, ParticipantId, TripmateError};
use tripmate_partition::{CancelFlag, PartitionOptions, PartitionOutcome, Partitioner};
use tripmate_scoring::{ConflictDetector, ConflictOptions, ConflictReport};

use crate::batch::{BatchOptions, BatchOrchestrator, BatchResult, ProgressCallback};
use crate::output::{AlgorithmComparison, AlgorithmRun, CacheWarmReport, GroupAnalysis, JobOutput};
use crate::queue::{JobContext, JobError, JobExecutor, JobPayload, ProgressReporter};

/// Runs every [`JobPayload`] kind against the batch orchestrator, the
/// partitioner and the conflict detector.
///
/// Partitioning is CPU-bound and runs on the blocking thread pool. A job
/// dropped mid-partition (timeout, shutdown abort) cancels that work.
#[derive(Debug, Clone)]
pub struct EngineJobExecutor {
    orchestrator: BatchOrchestrator,
    partitioner: Arc<Partitioner>,
    detector: Arc<ConflictDetector>,
}

impl EngineJobExecutor {
    pub fn new(
        orchestrator: BatchOrchestrator,
        partitioner: Arc<Partitioner>,
        detector: Arc<ConflictDetector>,
    ) -> Self {
        Self {
            orchestrator,
            partitioner,
            detector,
        }
    }

    async fn bulk(
        &self,
        ids: &[ParticipantId],
        options: &BatchOptions,
        progress: &ProgressReporter,
    ) -> Result<BatchResult, JobError> {
        let reporter = progress.clone();
        let callback: ProgressCallback = Arc::new(move |p| {
            reporter.report(p.percentage, Some(format!("{:?} phase", p.phase).to_lowercase()));
        });
        Ok(self
            .orchestrator
            .compute_all_pairs(ids, options, Some(callback))
            .await?)
    }

    async fn group_analysis(
        &self,
        ids: &[ParticipantId],
        options: &PartitionOptions,
        progress: &ProgressReporter,
    ) -> Result<GroupAnalysis, JobError> {
        let participants = self.orchestrator.fetch_participants(ids).await?;
        progress.report(10.0, Some("profiles loaded".into()));

        let partitioner = Arc::clone(&self.partitioner);
        let detector = Arc::clone(&self.detector);
        let options = options.clone();
        let cancel = CancelFlag::new();
        let _stop_if_abandoned = cancel.cancel_on_drop();
        task::spawn_blocking(move || {
            let partition = partitioner.partition_cancellable(&participants, &options, &cancel)?;
            let group_conflicts = group_conflicts(&detector, &participants, &partition)?;
            Ok::<_, TripmateError>(GroupAnalysis {
                partition,
                group_conflicts,
            })
        })
        .await
        .map_err(|e| JobError::Failed(format!("partition task failed: {e}")))?
        .map_err(JobError::from)
    }

    async fn compare_algorithms(
        &self,
        ids: &[ParticipantId],
        options: &PartitionOptions,
        algorithms: &[PartitionAlgorithm],
        progress: &ProgressReporter,
    ) -> Result<AlgorithmComparison, JobError> {
        let participants = Arc::new(self.orchestrator.fetch_participants(ids).await?);
        let algorithms: Vec<PartitionAlgorithm> = if algorithms.is_empty() {
            PartitionAlgorithm::ALL.to_vec()
        } else {
            algorithms.to_vec()
        };

        let mut options = options.clone();
        let mut runs = Vec::with_capacity(algorithms.len());
        let cancel = CancelFlag::new();
        let _stop_if_abandoned = cancel.cancel_on_drop();
        for (done, algorithm) in algorithms.iter().copied().enumerate() {
            let run_options = options.clone().with_algorithm(algorithm);
            let partitioner = Arc::clone(&self.partitioner);
            let pool = Arc::clone(&participants);
            let cancel = cancel.clone();
            let started = Instant::now();
            let outcome = task::spawn_blocking(move || {
                partitioner.partition_cancellable(&pool, &run_options, &cancel)
            })
                .await
                .map_err(|e| JobError::Failed(format!("partition task failed: {e}")))??;
            // Every later run reuses the first run's seed.
            options.seed = Some(outcome.seed);

            let run = AlgorithmRun {
                requested: algorithm,
                algorithm_used: outcome.algorithm_used,
                degraded: outcome.degraded,
                objective: outcome.objective,
                group_sizes: outcome.group_sizes(),
                duration_ms: started.elapsed().as_millis() as u64,
            };
            debug!(
                event = "algorithm_run",
                algorithm = %algorithm,
                objective = run.objective,
                degraded = run.degraded,
                duration_ms = run.duration_ms,
            );
            runs.push(run);
            progress.report(
                (done + 1) as f64 * 100.0 / algorithms.len() as f64,
                Some(algorithm.name().to_string()),
            );
        }
        Ok(AlgorithmComparison { runs })
    }

    async fn warm_cache(
        &self,
        id_sets: &[Vec<ParticipantId>],
        options: &BatchOptions,
        progress: &ProgressReporter,
    ) -> Result<CacheWarmReport, JobError> {
        let options = options.clone().with_cache_results(true);
        let mut report = CacheWarmReport {
            sets: id_sets.len(),
            ..CacheWarmReport::default()
        };
        for (done, ids) in id_sets.iter().enumerate() {
            let key = BatchOrchestrator::cache_key(ids, &options);
            if self.orchestrator.cache().contains::<BatchResult>(&key) {
                report.already_cached += 1;
            } else {
                self.orchestrator.compute_all_pairs(ids, &options, None).await?;
                report.computed += 1;
            }
            progress.report((done + 1) as f64 * 100.0 / id_sets.len() as f64, None);
        }
        Ok(report)
    }
}

/// Conflict report of every group with at least two members.
fn group_conflicts(
    detector: &ConflictDetector,
    participants: &[Participant],
    partition: &PartitionOutcome,
) -> Result<Vec<ConflictReport>, TripmateError> {
    let by_id: HashMap<&ParticipantId, &Participant> =
        participants.iter().map(|p| (&p.id, p)).collect();
    partition
        .groups
        .iter()
        .map(|group| {
            if group.len() < 2 {
                return Ok(ConflictReport::default());
            }
            let members: Vec<Participant> = group
                .members
                .iter()
                .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
                .collect();
            detector.detect(&members, &ConflictOptions::default())
        })
        .collect()
}

#[async_trait]
impl JobExecutor for EngineJobExecutor {
    async fn execute(&self, payload: &JobPayload, ctx: JobContext) -> Result<JobOutput, JobError> {
        let progress = &ctx.progress;
        match payload {
            JobPayload::BulkCompatibility {
                participant_ids,
                options,
            } => self
                .bulk(participant_ids, options, progress)
                .await
                .map(JobOutput::BulkCompatibility),
            JobPayload::GroupAnalysis {
                participant_ids,
                options,
            } => self
                .group_analysis(participant_ids, options, progress)
                .await
                .map(JobOutput::GroupAnalysis),
            JobPayload::AlgorithmComparison {
                participant_ids,
                options,
                algorithms,
            } => self
                .compare_algorithms(participant_ids, options, algorithms, progress)
                .await
                .map(JobOutput::AlgorithmComparison),
            JobPayload::CacheWarm { id_sets, options } => self
                .warm_cache(id_sets, options, progress)
                .await
                .map(JobOutput::CacheWarm),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
