//! The seam between the queue and the work it runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use tripmate_core::TripmateError;

use super::job::{JobId, JobKind, JobPayload, JobProgress};
use crate::output::JobOutput;

/// Failure of one job attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    /// A failure that may succeed on retry.
    #[error("job failed: {0}")]
    Failed(String),

    /// The payload can never succeed; retries are skipped.
    #[error("job rejected: {0}")]
    Rejected(String),

    #[error("job timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

impl JobError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, JobError::Rejected(_))
    }
}

impl From<TripmateError> for JobError {
    fn from(e: TripmateError) -> Self {
        if e.is_permanent() {
            JobError::Rejected(e.to_string())
        } else {
            JobError::Failed(e.to_string())
        }
    }
}

impl From<JobError> for TripmateError {
    fn from(e: JobError) -> Self {
        TripmateError::JobFailure(e.to_string())
    }
}

type ProgressSink = Arc<dyn Fn(JobProgress) + Send + Sync>;

/// Lets a running job publish its progress to its queue record.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sink: Option<ProgressSink>,
}

impl ProgressReporter {
    pub fn new(sink: impl Fn(JobProgress) + Send + Sync + 'static) -> Self {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    /// A reporter that discards every update.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Publishes `percentage`, clamped to 0..=100.
    pub fn report(&self, percentage: f64, message: Option<String>) {
        if let Some(sink) = &self.sink {
            let percentage = if percentage.is_finite() {
                percentage.clamp(0.0, 100.0)
            } else {
                0.0
            };
            sink(JobProgress { percentage, message });
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

/// Per-attempt context handed to an executor.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: JobId,
    pub kind: JobKind,
    /// Retries before this attempt.
    pub retry_count: u32,
    pub progress: ProgressReporter,
}

impl JobContext {
    /// Context for running a payload outside a queue.
    pub fn detached(kind: JobKind) -> Self {
        Self {
            job_id: JobId::new(),
            kind,
            retry_count: 0,
            progress: ProgressReporter::noop(),
        }
    }
}

/// Runs job payloads.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self, payload: &JobPayload, ctx: JobContext) -> Result<JobOutput, JobError>;
}
