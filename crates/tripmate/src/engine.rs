//! The engine service object.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tripmate_config::EngineConfig;
use tripmate_core::{validate_ids, CompatibilityScore, Participant, ParticipantId, Result};
use tripmate_partition::{PartitionOptions, PartitionOutcome, Partitioner};
use tripmate_scoring::{
    ConflictDetector, ConflictOptions, ConflictReport, GroupCompatibility, TraitScorer,
};
use tripmate_service::batch::DEFAULT_ALGORITHM_ID;
use tripmate_service::{
    BatchOptions, BatchOrchestrator, BatchResult, CacheStats, JobId, JobPayload, JobQueue,
    JobReceipt, JobRequest, JobStatus, Priority, ShutdownReport,
};

use crate::builder::EngineBuilder;

/// Options of a queued all-pairs batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchJobOptions {
    pub priority: Priority,
    pub algorithm_id: String,
    pub include_matrix: bool,
    pub cache_results: bool,
}

impl BatchJobOptions {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_matrix(mut self, include: bool) -> Self {
        self.include_matrix = include;
        self
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions::new()
            .with_algorithm_id(self.algorithm_id.clone())
            .with_matrix(self.include_matrix)
            .with_cache_results(self.cache_results)
    }
}

impl Default for BatchJobOptions {
    fn default() -> Self {
        Self {
            priority: Priority::Normal,
            algorithm_id: DEFAULT_ALGORITHM_ID.to_string(),
            include_matrix: false,
            cache_results: true,
        }
    }
}

/// Traveler group compatibility engine.
///
/// Owns the scorer, the conflict detector, the partitioner, the batch
/// orchestrator with its result cache, and the job queue. Synchronous
/// operations can be called from any thread; the engine itself must be
/// built inside a tokio runtime because it starts the queue workers.
///
/// # Example
///
/// ```
/// use tripmate::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> tripmate::Result<()> {
/// let engine = Engine::builder().build()?;
///
/// let mut calm = RawProfile::new();
/// calm.insert("energy_level", 20.0);
/// let mut lively = RawProfile::new();
/// lively.insert("energy_level", 90.0);
///
/// let a = Participant::from_raw("ana", &calm);
/// let b = Participant::from_raw("ben", &lively);
/// let score = engine.compute_compatibility(&a, &b);
/// assert_eq!(score.overall, engine.compute_compatibility(&b, &a).overall);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    scorer: Arc<TraitScorer>,
    detector: Arc<ConflictDetector>,
    partitioner: Arc<Partitioner>,
    orchestrator: BatchOrchestrator,
    queue: JobQueue,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        scorer: Arc<TraitScorer>,
        detector: Arc<ConflictDetector>,
        partitioner: Arc<Partitioner>,
        orchestrator: BatchOrchestrator,
        queue: JobQueue,
    ) -> Self {
        Self {
            config,
            scorer,
            detector,
            partitioner,
            orchestrator,
            queue,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Partition options seeded from the configured defaults.
    pub fn default_partition_options(&self) -> PartitionOptions {
        PartitionOptions::from_config(&self.config.partition)
    }

    /// Symmetric compatibility of two participants, in [0, 100].
    pub fn compute_compatibility(&self, a: &Participant, b: &Participant) -> CompatibilityScore {
        self.scorer.score(a, b)
    }

    /// Mean pairwise compatibility of a group.
    pub fn compute_group_compatibility(
        &self,
        participants: &[Participant],
    ) -> Result<GroupCompatibility> {
        self.scorer.group_compatibility(participants)
    }

    pub fn detect_conflicts(
        &self,
        participants: &[Participant],
        options: &ConflictOptions,
    ) -> Result<ConflictReport> {
        self.detector.detect(participants, options)
    }

    /// Splits `participants` into balanced groups.
    ///
    /// CPU-bound; from async code prefer a queued group-analysis job or
    /// `spawn_blocking`.
    pub fn partition_into_groups(
        &self,
        participants: &[Participant],
        options: &PartitionOptions,
    ) -> Result<PartitionOutcome> {
        self.partitioner.partition(participants, options)
    }

    /// Scores every pair of `ids` without going through the queue.
    pub async fn compute_all_pairs(
        &self,
        ids: &[ParticipantId],
        options: &BatchOptions,
    ) -> Result<BatchResult> {
        self.orchestrator.compute_all_pairs(ids, options, None).await
    }

    /// Queues an all-pairs batch.
    ///
    /// The id list is validated before the job is queued.
    pub fn submit_batch_job(
        &self,
        ids: Vec<ParticipantId>,
        options: BatchJobOptions,
    ) -> Result<JobReceipt> {
        validate_ids(&ids)?;
        let request = JobRequest::new(JobPayload::BulkCompatibility {
            participant_ids: ids,
            options: options.batch_options(),
        })
        .with_priority(options.priority);
        self.queue.enqueue(request)
    }

    pub fn submit_job(&self, request: JobRequest) -> Result<JobReceipt> {
        self.queue.enqueue(request)
    }

    pub fn get_job_status(&self, job_id: JobId) -> Option<JobStatus> {
        self.queue.status(job_id)
    }

    /// Cancels a job that has not started yet.
    pub fn cancel_job(&self, job_id: JobId) -> bool {
        self.queue.cancel(job_id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.orchestrator.cache().stats()
    }

    /// Stops the job queue, giving in-flight jobs `grace` to finish.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        self.queue.shutdown(grace).await
    }

    /// [`Engine::shutdown`] with the configured grace period.
    pub async fn shutdown_gracefully(&self) -> ShutdownReport {
        self.queue.shutdown(self.config.queue.shutdown_grace()).await
    }
}
