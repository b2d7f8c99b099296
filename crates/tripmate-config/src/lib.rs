//! Configuration system for Tripmate.
//!
//! Load engine configuration from TOML or YAML files to tune scoring,
//! conflict thresholds, partitioning, batching, the job queue and the
//! result cache without code changes. Every field has a default, so a
//! partial file (or none at all) is valid.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use tripmate_config::{EngineConfig, PartitionAlgorithm};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [partition]
//!     target_group_size = 4
//!     algorithm = "hierarchical"
//!     random_seed = 7
//!
//!     [queue]
//!     worker_pool_size = 2
//! "#).unwrap();
//!
//! assert_eq!(config.partition.target_group_size, 4);
//! assert_eq!(config.partition.algorithm, PartitionAlgorithm::Hierarchical);
//! assert_eq!(config.queue.worker_pool_size, 2);
//! assert_eq!(config.queue.max_retries, 3);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use tripmate_config::EngineConfig;
//!
//! let config = EngineConfig::load("tripmate.toml").unwrap_or_default();
//! assert_eq!(config.partition.target_group_size, 6);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Pairwise scoring rules.
    pub scoring: ScoringConfig,

    /// Conflict detection thresholds.
    pub conflict: ConflictConfig,

    /// Group partitioning.
    pub partition: PartitionConfig,

    /// All-pairs batch computation.
    pub batch: BatchConfig,

    /// Asynchronous job queue.
    pub queue: QueueConfig,

    /// Result cache.
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the partitioning random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.partition.random_seed = Some(seed);
        self
    }

    /// Sets the default target group size.
    pub fn with_target_group_size(mut self, size: usize) -> Self {
        self.partition.target_group_size = size;
        self
    }

    /// Sets the default partitioning algorithm.
    pub fn with_algorithm(mut self, algorithm: PartitionAlgorithm) -> Self {
        self.partition.algorithm = algorithm;
        self
    }

    /// Sets the number of queue workers.
    pub fn with_worker_pool_size(mut self, workers: usize) -> Self {
        self.queue.worker_pool_size = workers;
        self
    }

    /// Sets the retry budget of queued jobs.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.queue.max_retries = retries;
        self
    }

    /// Checks cross-field invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partition.target_group_size < 2 {
            return Err(invalid("partition.target_group_size must be at least 2"));
        }
        if self.queue.worker_pool_size == 0 {
            return Err(invalid("queue.worker_pool_size must be at least 1"));
        }
        if self.batch.max_concurrency == 0 {
            return Err(invalid("batch.max_concurrency must be at least 1"));
        }
        if self.batch.fetch_concurrency == 0 {
            return Err(invalid("batch.fetch_concurrency must be at least 1"));
        }
        if self.batch.direct_pair_limit > self.batch.chunked_pair_limit {
            return Err(invalid(
                "batch.direct_pair_limit must not exceed batch.chunked_pair_limit",
            ));
        }
        if self.batch.medium_chunk_count < 2 || self.batch.large_chunk_count < 2 {
            return Err(invalid("batch chunk counts must be at least 2"));
        }
        if self.cache.base_ttl_secs > self.cache.max_ttl_secs {
            return Err(invalid("cache.base_ttl_secs must not exceed cache.max_ttl_secs"));
        }
        for (name, t) in [
            ("conflict.energy", &self.conflict.energy),
            ("conflict.social", &self.conflict.social),
            ("conflict.leadership", &self.conflict.leadership),
            ("conflict.risk", &self.conflict.risk),
        ] {
            if !t.is_ordered() {
                return Err(invalid(format!(
                    "{name} thresholds must satisfy minor <= major <= critical"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Pairwise scoring configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Age gap in years up to which age compatibility stays near-maximal.
    pub age_soft_threshold: f64,

    /// Leadership value above which a participant counts as a strong leader.
    pub strong_leader_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            age_soft_threshold: 15.0,
            strong_leader_threshold: 75.0,
        }
    }
}

/// Severity cutoffs for one conflict category.
///
/// For gap-based categories the cutoffs apply to the absolute difference;
/// for leadership they apply to the weaker of the two leadership values,
/// and the minor cutoff is exclusive there.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SeverityThresholds {
    pub minor: f64,
    pub major: f64,
    pub critical: f64,
}

impl SeverityThresholds {
    pub const fn new(minor: f64, major: f64, critical: f64) -> Self {
        Self {
            minor,
            major,
            critical,
        }
    }

    fn is_ordered(&self) -> bool {
        self.minor <= self.major && self.major <= self.critical
    }
}

/// Conflict detection configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConflictConfig {
    pub energy: SeverityThresholds,
    pub social: SeverityThresholds,
    pub leadership: SeverityThresholds,
    pub risk: SeverityThresholds,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            energy: SeverityThresholds::new(40.0, 55.0, 70.0),
            social: SeverityThresholds::new(40.0, 55.0, 70.0),
            leadership: SeverityThresholds::new(75.0, 80.0, 85.0),
            risk: SeverityThresholds::new(50.0, 65.0, 80.0),
        }
    }
}

/// Group partitioning algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionAlgorithm {
    /// Centroid (k-means style) clustering.
    Centroid,

    /// Agglomerative average-linkage clustering.
    Hierarchical,

    /// Best of centroid and hierarchical, refined by swap local search.
    #[default]
    Hybrid,
}

impl PartitionAlgorithm {
    pub const ALL: [PartitionAlgorithm; 3] = [
        PartitionAlgorithm::Centroid,
        PartitionAlgorithm::Hierarchical,
        PartitionAlgorithm::Hybrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PartitionAlgorithm::Centroid => "centroid",
            PartitionAlgorithm::Hierarchical => "hierarchical",
            PartitionAlgorithm::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for PartitionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitionAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "centroid" | "kmeans" | "k-means" => Ok(PartitionAlgorithm::Centroid),
            "hierarchical" | "agglomerative" => Ok(PartitionAlgorithm::Hierarchical),
            "hybrid" => Ok(PartitionAlgorithm::Hybrid),
            other => Err(invalid(format!("unknown partition algorithm '{other}'"))),
        }
    }
}

/// Group partitioning configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PartitionConfig {
    /// Preferred number of participants per group.
    pub target_group_size: usize,

    /// Default algorithm.
    pub algorithm: PartitionAlgorithm,

    /// Weigh conflicts heavily when forming groups.
    pub avoid_conflicts: bool,

    /// Random seed for reproducible results.
    pub random_seed: Option<u64>,

    /// Iteration cap of centroid clustering.
    pub max_centroid_iterations: usize,

    /// Step cap of the swap refinement.
    pub max_refinement_steps: u64,

    /// Optional wall-clock cap of the swap refinement, in milliseconds.
    pub refinement_time_limit_ms: Option<u64>,

    /// Conflict penalty weight used when avoiding conflicts.
    pub conflict_penalty_weight: f64,

    /// Conflict penalty weight used otherwise.
    pub base_conflict_penalty_weight: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            target_group_size: 6,
            algorithm: PartitionAlgorithm::Hybrid,
            avoid_conflicts: false,
            random_seed: None,
            max_centroid_iterations: 50,
            max_refinement_steps: 200,
            refinement_time_limit_ms: None,
            conflict_penalty_weight: 15.0,
            base_conflict_penalty_weight: 2.0,
        }
    }
}

impl PartitionConfig {
    pub fn refinement_time_limit(&self) -> Option<Duration> {
        self.refinement_time_limit_ms.map(Duration::from_millis)
    }

    /// Penalty weight applied per unit of in-group conflict.
    pub fn penalty_weight(&self, avoid_conflicts: bool) -> f64 {
        if avoid_conflicts {
            self.conflict_penalty_weight
        } else {
            self.base_conflict_penalty_weight
        }
    }
}

/// All-pairs batch configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BatchConfig {
    /// Largest pair count computed directly without chunking.
    pub direct_pair_limit: usize,

    /// Largest pair count using the medium chunk count.
    pub chunked_pair_limit: usize,

    /// Chunks used between the two limits.
    pub medium_chunk_count: usize,

    /// Chunks used above `chunked_pair_limit`.
    pub large_chunk_count: usize,

    /// Pair computations in flight at once.
    pub max_concurrency: usize,

    /// Profile fetches in flight at once.
    pub fetch_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            direct_pair_limit: 50,
            chunked_pair_limit: 500,
            medium_chunk_count: 4,
            large_chunk_count: 8,
            max_concurrency: 10,
            fetch_concurrency: 16,
        }
    }
}

/// Per-kind job timeouts, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct JobTimeoutConfig {
    pub bulk_compatibility_ms: u64,
    pub group_analysis_ms: u64,
    pub algorithm_comparison_ms: u64,
    pub cache_warm_ms: u64,
}

impl Default for JobTimeoutConfig {
    fn default() -> Self {
        Self {
            bulk_compatibility_ms: 300_000,
            group_analysis_ms: 600_000,
            algorithm_comparison_ms: 600_000,
            cache_warm_ms: 300_000,
        }
    }
}

/// Job queue configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct QueueConfig {
    /// Number of parallel workers.
    pub worker_pool_size: usize,

    /// Retries after the first failed attempt.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub base_backoff_ms: u64,

    /// Upper bound of any retry delay.
    pub max_backoff_ms: u64,

    /// Time in-flight jobs get to finish on shutdown.
    pub shutdown_grace_ms: u64,

    /// Assumed job duration before any job has finished.
    pub default_job_estimate_ms: u64,

    /// How long finished jobs stay queryable.
    pub retain_finished_ms: u64,

    /// Finished jobs kept at most; the oldest are dropped first.
    pub max_finished_jobs: usize,

    pub timeouts: JobTimeoutConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 3,
            max_retries: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            shutdown_grace_ms: 30_000,
            default_job_estimate_ms: 5_000,
            retain_finished_ms: 60 * 60 * 1_000,
            max_finished_jobs: 1_000,
            timeouts: JobTimeoutConfig::default(),
        }
    }
}

impl QueueConfig {
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn retain_finished(&self) -> Duration {
        Duration::from_millis(self.retain_finished_ms)
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CacheConfig {
    /// Disable to bypass the cache entirely.
    pub enabled: bool,

    /// Maximum number of cached entries.
    pub max_entries: u64,

    /// TTL of the smallest batches.
    pub base_ttl_secs: u64,

    /// Upper bound of any TTL.
    pub max_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            base_ttl_secs: 300,
            max_ttl_secs: 4 * 60 * 60,
        }
    }
}

impl CacheConfig {
    /// TTL for a batch of `participant_count` participants.
    ///
    /// Grows linearly with batch size (larger batches are costlier to
    /// recompute) and is capped at `max_ttl_secs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tripmate_config::CacheConfig;
    ///
    /// let cache = CacheConfig::default();
    /// assert_eq!(cache.ttl_for_batch(10), Duration::from_secs(300));
    /// assert_eq!(cache.ttl_for_batch(50), Duration::from_secs(900));
    /// assert_eq!(cache.ttl_for_batch(100_000), Duration::from_secs(4 * 60 * 60));
    /// ```
    pub fn ttl_for_batch(&self, participant_count: usize) -> Duration {
        let factor = 1 + (participant_count as u64) / 25;
        let secs = self.base_ttl_secs.saturating_mul(factor);
        Duration::from_secs(secs.min(self.max_ttl_secs))
    }
}

#[cfg(test)]
mod tests;
