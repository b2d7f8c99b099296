//! Swap-based local search used to refine a partition.

mod acceptor;
mod phase;
mod stats;
mod swap;
mod termination;

pub use acceptor::{Acceptor, HillClimbingAcceptor};
pub use phase::SwapLocalSearch;
pub use stats::{RefinementStats, RefinementStop};
pub use swap::{SwapMove, SwapState};
pub use termination::{
    ExternalTermination, RefinementScope, StepCountTermination, Termination, TimeTermination,
};
