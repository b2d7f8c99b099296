//! Tripmate Scoring - Compatibility scoring and conflict detection
//!
//! - [`TraitScorer`]: symmetric pairwise compatibility with a per-dimension
//!   breakdown and a confidence derived from defaulted values
//! - [`CompatibilityMatrix`]: the full n×n score grid
//! - [`ConflictDetector`]: categorized interpersonal risk signals

pub mod conflict;
pub mod group;
pub mod matrix;
pub mod rules;
pub mod scorer;
pub mod weights;

pub use conflict::{
    ConflictCategory, ConflictDetector, ConflictOptions, ConflictReport, ConflictSummary,
    PairConflict, Severity,
};
pub use group::GroupCompatibility;
pub use matrix::CompatibilityMatrix;
pub use rules::SimilarityRules;
pub use scorer::{ProfileComparison, TraitScorer};
pub use weights::DimensionWeights;
