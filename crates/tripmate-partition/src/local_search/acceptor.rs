//! Move acceptance.

use std::fmt::Debug;

/// Decides whether a move leading to `move_score` is taken.
pub trait Acceptor: Send + Debug {
    /// Returns true if a move resulting in `move_score` should be accepted,
    /// given the objective after the previous step.
    fn is_accepted(&self, last_step_score: f64, move_score: f64) -> bool;

    /// Called when refinement starts.
    fn phase_started(&mut self, _initial_score: f64) {}

    /// Called after an accepted move has been applied.
    fn step_ended(&mut self, _step_score: f64) {}
}

/// Hill climbing acceptor - accepts only strictly improving moves.
///
/// Improvements smaller than `min_improvement` are treated as ties so that
/// floating point noise cannot make the search cycle.
///
/// # Example
///
/// ```
/// use tripmate_partition::local_search::{Acceptor, HillClimbingAcceptor};
///
/// let acceptor = HillClimbingAcceptor::new();
/// assert!(acceptor.is_accepted(70.0, 70.5));
/// assert!(!acceptor.is_accepted(70.0, 70.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HillClimbingAcceptor {
    min_improvement: f64,
}

impl HillClimbingAcceptor {
    pub const DEFAULT_MIN_IMPROVEMENT: f64 = 1e-9;

    pub fn new() -> Self {
        Self::with_min_improvement(Self::DEFAULT_MIN_IMPROVEMENT)
    }

    pub fn with_min_improvement(min_improvement: f64) -> Self {
        Self {
            min_improvement: min_improvement.max(0.0),
        }
    }
}

impl Default for HillClimbingAcceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Acceptor for HillClimbingAcceptor {
    fn is_accepted(&self, last_step_score: f64, move_score: f64) -> bool {
        move_score - last_step_score > self.min_improvement
    }
}
