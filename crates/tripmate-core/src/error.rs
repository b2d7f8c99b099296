//! Error types for Tripmate

use thiserror::Error;

/// Main error type for Tripmate operations.
///
/// Mirrors the engine's error taxonomy: validation problems are surfaced
/// immediately and never retried, computation failures are recovered by the
/// caller where possible, job failures go through the queue's retry policy
/// and cache problems never escape the cache.
#[derive(Debug, Error)]
pub enum TripmateError {
    /// Invalid call shape (empty input, duplicate ids, bad group size).
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal scoring or clustering step failed.
    #[error("Computation error: {0}")]
    Computation(String),

    /// A queued job failed or timed out.
    #[error("Job failure: {0}")]
    JobFailure(String),

    /// A cache read or write failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The job queue no longer accepts work.
    #[error("Job queue is shut down")]
    QueueClosed,

    /// Error in engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TripmateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Returns true if retrying the same call cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_) | Self::QueueClosed)
    }
}

/// Result type alias for Tripmate operations
pub type Result<T> = std::result::Result<T, TripmateError>;
