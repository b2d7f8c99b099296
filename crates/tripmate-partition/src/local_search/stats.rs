//! Refinement statistics.

use serde::{Deserialize, Serialize};

/// Why refinement stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStop {
    /// No improving swap exists.
    LocalOptimum,
    StepLimit,
    TimeLimit,
    Cancelled,
}

/// Summary of one swap refinement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementStats {
    /// Accepted swaps.
    pub steps: u64,
    pub moves_evaluated: u64,
    pub initial_objective: f64,
    pub final_objective: f64,
    pub elapsed_ms: u64,
    pub stop: RefinementStop,
}

impl RefinementStats {
    pub fn improvement(&self) -> f64 {
        self.final_objective - self.initial_objective
    }
}
