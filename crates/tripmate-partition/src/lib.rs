//! Tripmate Partition - Balanced travel group partitioning
//!
//! Splits a participant pool into groups of a target size that maximize
//! mean in-group compatibility while penalizing interpersonal conflicts.
//!
//! # Architecture
//!
//! - [`balance`]: group count and size plan
//! - [`context`]: precomputed score and penalty matrices
//! - [`strategy`]: centroid, agglomerative and hybrid strategies
//! - [`local_search`]: swap hill climbing with pluggable terminations
//! - [`chain`]: ordered fallback between strategies
//! - [`Partitioner`]: the entry point

pub mod balance;
mod cancel;
pub mod chain;
pub mod context;
pub mod error;
pub mod local_search;
pub mod objective;
pub mod partitioner;
pub mod strategy;

pub use cancel::{CancelFlag, CancelGuard};
pub use chain::{ChainOutcome, StrategyChain};
pub use context::PartitionContext;
pub use error::StrategyFailure;
pub use local_search::{RefinementStats, RefinementStop};
pub use partitioner::{Group, PartitionOptions, PartitionOutcome, Partitioner};
pub use strategy::{
    AgglomerativeStrategy, CentroidStrategy, HybridStrategy, PartitionStrategy, StrategyOutput,
};
pub use tripmate_config::PartitionAlgorithm;

#[cfg(test)]
mod tests;
