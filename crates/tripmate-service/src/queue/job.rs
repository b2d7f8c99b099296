//! Job records and request types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tripmate_config::{JobTimeoutConfig, PartitionAlgorithm};
use tripmate_core::ParticipantId;
use tripmate_partition::PartitionOptions;

use crate::batch::BatchOptions;
use crate::output::JobOutput;

/// Unique id of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    BulkCompatibility,
    GroupAnalysis,
    AlgorithmComparison,
    CacheWarm,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::BulkCompatibility => "bulk_compatibility",
            JobKind::GroupAnalysis => "group_analysis",
            JobKind::AlgorithmComparison => "algorithm_comparison",
            JobKind::CacheWarm => "cache_warm",
        }
    }

    /// Configured timeout for jobs of this kind.
    pub fn timeout(self, timeouts: &JobTimeoutConfig) -> Duration {
        let ms = match self {
            JobKind::BulkCompatibility => timeouts.bulk_compatibility_ms,
            JobKind::GroupAnalysis => timeouts.group_analysis_ms,
            JobKind::AlgorithmComparison => timeouts.algorithm_comparison_ms,
            JobKind::CacheWarm => timeouts.cache_warm_ms,
        };
        Duration::from_millis(ms)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch priority. Lower variants are dispatched first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Normal, Priority::Low];

    pub(crate) fn lane(self) -> usize {
        self as usize
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed work description of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum JobPayload {
    BulkCompatibility {
        participant_ids: Vec<ParticipantId>,
        options: BatchOptions,
    },
    GroupAnalysis {
        participant_ids: Vec<ParticipantId>,
        options: PartitionOptions,
    },
    /// Partitions the same pool once per algorithm with one shared seed.
    AlgorithmComparison {
        participant_ids: Vec<ParticipantId>,
        options: PartitionOptions,
        algorithms: Vec<PartitionAlgorithm>,
    },
    /// Computes and caches all-pairs results for several participant sets.
    CacheWarm {
        id_sets: Vec<Vec<ParticipantId>>,
        options: BatchOptions,
    },
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::BulkCompatibility { .. } => JobKind::BulkCompatibility,
            JobPayload::GroupAnalysis { .. } => JobKind::GroupAnalysis,
            JobPayload::AlgorithmComparison { .. } => JobKind::AlgorithmComparison,
            JobPayload::CacheWarm { .. } => JobKind::CacheWarm,
        }
    }
}

/// A job to enqueue.
///
/// Retry budget and timeout default to the queue configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub payload: JobPayload,
    pub priority: Priority,
    pub max_retries: Option<u32>,
    pub timeout: Option<Duration>,
}

impl JobRequest {
    pub fn new(payload: JobPayload) -> Self {
        Self {
            payload,
            priority: Priority::Normal,
            max_retries: None,
            timeout: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Progress an executor reported for a running job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Completion in percent, 0 to 100.
    pub percentage: f64,
    pub message: Option<String>,
}

/// Snapshot of a job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub state: JobState,
    pub kind: JobKind,
    pub priority: Priority,
    pub retry_count: u32,
    pub max_retries: u32,
    pub progress: Option<JobProgress>,
    pub result: Option<JobOutput>,
    /// Last error; kept after a successful retry.
    pub error: Option<String>,
    /// Zero-based position among queued jobs, while queued.
    pub queue_position: Option<usize>,
}

/// Acknowledgement of an enqueued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReceipt {
    pub job_id: JobId,
    /// Number of queued jobs dispatched before this one.
    pub queue_position: usize,
    pub estimated_start: Duration,
}
