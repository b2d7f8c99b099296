//! Outputs of completed jobs.

use serde::{Deserialize, Serialize};

use tripmate_config::PartitionAlgorithm;
use tripmate_partition::PartitionOutcome;
use tripmate_scoring::ConflictReport;

use crate::batch::BatchResult;

/// Result of one job, by job kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "output")]
pub enum JobOutput {
    BulkCompatibility(BatchResult),
    GroupAnalysis(GroupAnalysis),
    AlgorithmComparison(AlgorithmComparison),
    CacheWarm(CacheWarmReport),
}

/// Partition of a pool plus the conflicts inside every group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAnalysis {
    pub partition: PartitionOutcome,
    /// One report per group, in group order.
    pub group_conflicts: Vec<ConflictReport>,
}

/// One partition run per requested algorithm on the same pool and seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmComparison {
    pub runs: Vec<AlgorithmRun>,
}

impl AlgorithmComparison {
    /// Run with the highest objective; ties keep the earlier run.
    pub fn best(&self) -> Option<&AlgorithmRun> {
        self.runs.iter().fold(None, |best: Option<&AlgorithmRun>, run| match best {
            Some(b) if b.objective >= run.objective => Some(b),
            _ => Some(run),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRun {
    pub requested: PartitionAlgorithm,
    pub algorithm_used: PartitionAlgorithm,
    pub degraded: bool,
    pub objective: f64,
    pub group_sizes: Vec<usize>,
    pub duration_ms: u64,
}

/// Participant sets a cache-warm job visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheWarmReport {
    pub sets: usize,
    pub computed: usize,
    pub already_cached: usize,
}
