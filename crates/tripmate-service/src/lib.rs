//! Tripmate Service - Asynchronous surfaces of the compatibility engine
//!
//! - [`batch`]: all-pairs scoring with bounded concurrency and progress
//! - [`queue`]: prioritized job queue with retries and graceful shutdown
//! - [`cache`]: TTL result cache keyed by participant set
//! - [`EngineJobExecutor`]: runs queued jobs against the engine
//! - [`ParticipantProvider`] / [`ResultStore`]: collaborator seams
//!
//! Everything here runs on tokio. CPU-bound partitioning is moved to the
//! blocking pool.

pub mod batch;
pub mod cache;
pub mod executor;
pub mod output;
pub mod provider;
pub mod queue;
pub mod store;

pub use batch::{
    BatchOptions, BatchOrchestrator, BatchPhase, BatchProgress, BatchResult, BatchStrategy,
    ProgressCallback,
};
pub use cache::{CacheBackend, CacheError, CacheKey, CacheStats, MokaBackend, ResultCache};
pub use executor::EngineJobExecutor;
pub use output::{AlgorithmComparison, AlgorithmRun, CacheWarmReport, GroupAnalysis, JobOutput};
pub use provider::{InMemoryParticipantProvider, ParticipantProvider, ProviderError};
pub use queue::{
    JobContext, JobError, JobExecutor, JobId, JobKind, JobPayload, JobProgress, JobQueue,
    JobReceipt, JobRequest, JobState, JobStatus, Priority, ProgressReporter, RetryPolicy,
    ShutdownReport,
};
pub use store::{InMemoryResultStore, ResultStore, StoreError};
