//! Tripmate - Traveler Group Compatibility & Optimization Engine
//!
//! Scores pairwise compatibility from multi-dimensional trait profiles,
//! flags interpersonal conflicts, splits pools into balanced travel groups
//! and runs large all-pairs batches on a prioritized job queue.
//!
//! # Example
//!
//! ```rust
//! use tripmate::prelude::*;
//!
//! let mut quiet = RawProfile::new();
//! quiet.insert("social_preference", 15.0);
//! let participant = Participant::from_raw("ana", &quiet);
//! assert_eq!(participant.id.as_str(), "ana");
//! ```

mod builder;
mod engine;

pub use builder::EngineBuilder;
pub use engine::{BatchJobOptions, Engine};

// Core types
pub use tripmate_core::{
    CompatibilityScore, DimensionScore, Participant, ParticipantId, RawProfile, Result,
    TraitDimension, TraitProfile, TripmateError,
};

// Configuration
pub use tripmate_config::{ConfigError, EngineConfig, PartitionAlgorithm};

// Scoring and conflicts
pub use tripmate_scoring::{
    CompatibilityMatrix, ConflictCategory, ConflictOptions, ConflictReport, ConflictSummary,
    DimensionWeights, GroupCompatibility, PairConflict, Severity,
};

// Partitioning
pub use tripmate_partition::{Group, PartitionOptions, PartitionOutcome};

// Batch, queue and cache
pub use tripmate_service::{
    BatchOptions, BatchProgress, BatchResult, BatchStrategy, CacheStats, JobId, JobKind,
    JobOutput, JobPayload, JobReceipt, JobRequest, JobState, JobStatus, ParticipantProvider,
    Priority, ResultStore, ShutdownReport,
};

/// Lower-level building blocks, for wiring custom collaborators.
pub mod service {
    pub use tripmate_service::*;
}

#[cfg(feature = "console")]
pub use tripmate_console as console;

pub mod prelude {
    pub use super::{BatchJobOptions, Engine, EngineBuilder};
    pub use super::{
        BatchOptions, ConflictOptions, EngineConfig, JobRequest, JobState, PartitionAlgorithm,
        PartitionOptions, Priority,
    };
    pub use super::{Participant, ParticipantId, RawProfile, TraitDimension, TripmateError};
}
