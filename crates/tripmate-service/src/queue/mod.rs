//! Asynchronous job queue.
//!
//! Long-running requests (bulk compatibility, group analysis, algorithm
//! comparison, cache warming) are enqueued as typed jobs and run by a fixed
//! pool of tokio workers:
//!
//! - [`JobQueue`]: lanes, workers, retries, shutdown
//! - [`JobExecutor`]: the work behind a [`JobPayload`]
//! - [`RetryPolicy`]: exponential backoff between attempts

mod executor;
mod job;
mod job_queue;
mod lanes;
mod retry;

pub use executor::{JobContext, JobError, JobExecutor, ProgressReporter};
pub use job::{
    JobId, JobKind, JobPayload, JobProgress, JobReceipt, JobRequest, JobState, JobStatus, Priority,
};
pub use job_queue::{JobQueue, ShutdownReport};
pub use retry::RetryPolicy;
