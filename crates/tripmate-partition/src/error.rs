//! Strategy failures.

use thiserror::Error;

/// Why a single partition strategy could not produce a valid result.
///
/// A failure moves the strategy chain on to its next strategy; it only
/// surfaces to callers as a computation error once the chain is exhausted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyFailure {
    /// A distance, linkage or objective value was NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The strategy produced clusters that violate the balance plan or do
    /// not cover every participant exactly once.
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// Every sub-strategy of a composite strategy failed.
    #[error("all candidate strategies failed: {0}")]
    NoCandidate(String),

    /// The caller gave up on the partition.
    #[error("cancelled")]
    Cancelled,
}
