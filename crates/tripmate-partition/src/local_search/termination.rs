//! Refinement termination conditions.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use super::stats::RefinementStop;
use crate::cancel::CancelFlag;

/// Progress of a running refinement, as seen by terminations.
#[derive(Debug, Clone)]
pub struct RefinementScope {
    start: Instant,
    step_count: u64,
}

impl RefinementScope {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            step_count: 0,
        }
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub(crate) fn increment_step_count(&mut self) {
        self.step_count += 1;
    }
}

impl Default for RefinementScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for determining when to stop refining.
pub trait Termination: Send + Debug {
    /// Returns true if refinement should stop before the next step.
    fn is_terminated(&self, scope: &RefinementScope) -> bool;

    /// Reported stop reason when this termination fires.
    fn reason(&self) -> RefinementStop;
}

/// Terminates after a step count.
///
/// ```
/// use tripmate_partition::local_search::StepCountTermination;
///
/// let term = StepCountTermination::new(200);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for StepCountTermination {
    fn is_terminated(&self, scope: &RefinementScope) -> bool {
        scope.step_count() >= self.limit
    }

    fn reason(&self) -> RefinementStop {
        RefinementStop::StepLimit
    }
}

/// Terminates after a time limit.
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Termination for TimeTermination {
    fn is_terminated(&self, scope: &RefinementScope) -> bool {
        scope.elapsed() >= self.limit
    }

    fn reason(&self) -> RefinementStop {
        RefinementStop::TimeLimit
    }
}

/// Terminates once a [`CancelFlag`] is set.
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: CancelFlag,
}

impl ExternalTermination {
    pub fn new(flag: CancelFlag) -> Self {
        Self { flag }
    }
}

impl Termination for ExternalTermination {
    fn is_terminated(&self, _scope: &RefinementScope) -> bool {
        self.flag.is_cancelled()
    }

    fn reason(&self) -> RefinementStop {
        RefinementStop::Cancelled
    }
}
