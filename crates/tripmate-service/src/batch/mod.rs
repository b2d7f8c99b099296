//! All-pairs batch computation.
//!
//! Pairwise scoring is O(n²), so the orchestrator picks an execution
//! strategy from the pair count: small batches fan out one task per pair,
//! larger ones split participants into chunks and score intra-chunk blocks
//! before cross-chunk blocks, reporting progress after every block.

mod orchestrator;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tripmate_config::BatchConfig;
use tripmate_core::{CompatibilityScore, ParticipantId};
use tripmate_scoring::CompatibilityMatrix;

pub use orchestrator::BatchOrchestrator;

/// Algorithm id of the built-in trait scorer.
pub const DEFAULT_ALGORITHM_ID: &str = "trait-v1";

/// Execution plan of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BatchStrategy {
    /// One bounded task per pair.
    Direct,
    /// Intra-chunk blocks, then cross-chunk blocks.
    Chunked { chunks: usize },
}

impl BatchStrategy {
    /// Strategy for `participants` participants.
    ///
    /// ```
    /// use tripmate_config::BatchConfig;
    /// use tripmate_service::batch::BatchStrategy;
    ///
    /// let config = BatchConfig::default();
    /// assert_eq!(BatchStrategy::select(10, &config), BatchStrategy::Direct); // 45 pairs
    /// assert_eq!(BatchStrategy::select(20, &config), BatchStrategy::Chunked { chunks: 4 });
    /// assert_eq!(BatchStrategy::select(40, &config), BatchStrategy::Chunked { chunks: 8 });
    /// ```
    pub fn select(participants: usize, config: &BatchConfig) -> Self {
        let pairs = pair_count(participants);
        if pairs <= config.direct_pair_limit {
            BatchStrategy::Direct
        } else if pairs <= config.chunked_pair_limit {
            BatchStrategy::Chunked {
                chunks: config.medium_chunk_count,
            }
        } else {
            BatchStrategy::Chunked {
                chunks: config.large_chunk_count,
            }
        }
    }
}

impl fmt::Display for BatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStrategy::Direct => f.write_str("direct"),
            BatchStrategy::Chunked { chunks } => write!(f, "chunked({chunks})"),
        }
    }
}

/// Unordered pairs among `n` participants.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Per-call batch options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Part of the cache key; bump it when scoring semantics change.
    pub algorithm_id: String,
    pub include_matrix: bool,
    /// Store a freshly computed result in the cache.
    pub cache_results: bool,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matrix(mut self, include: bool) -> Self {
        self.include_matrix = include;
        self
    }

    pub fn with_cache_results(mut self, cache: bool) -> Self {
        self.cache_results = cache;
        self
    }

    pub fn with_algorithm_id(mut self, id: impl Into<String>) -> Self {
        self.algorithm_id = id.into();
        self
    }

    pub(crate) fn cache_config(&self) -> String {
        format!("{}|matrix={}", self.algorithm_id, self.include_matrix)
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            algorithm_id: DEFAULT_ALGORITHM_ID.to_string(),
            include_matrix: false,
            cache_results: true,
        }
    }
}

/// Chunked execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Intra,
    Inter,
}

/// Progress after a finished unit of chunked work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub processed_chunks: usize,
    pub total_chunks: usize,
    pub percentage: f64,
    pub phase: BatchPhase,
}

/// Receives batch progress updates.
pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// Every pairwise score of a participant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Participants in input order.
    pub participant_ids: Vec<ParticipantId>,
    /// One score per unordered pair, ordered by input index.
    pub scores: Vec<CompatibilityScore>,
    pub matrix: Option<CompatibilityMatrix>,
    pub strategy: BatchStrategy,
    pub pair_count: usize,
    pub from_cache: bool,
    pub duration_ms: u64,
}

impl BatchResult {
    pub fn score_between(&self, a: &ParticipantId, b: &ParticipantId) -> Option<&CompatibilityScore> {
        self.scores.iter().find(|s| s.involves_pair(a, b))
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.scores.iter().map(|s| s.overall).sum::<f64>() / self.scores.len() as f64)
    }
}
