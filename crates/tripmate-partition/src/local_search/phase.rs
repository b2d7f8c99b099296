//! Best-improvement swap refinement.

use std::time::Duration;

use tracing::{debug, trace};

use crate::context::PartitionContext;
use crate::objective::{objective, Clusters};

use super::acceptor::{Acceptor, HillClimbingAcceptor};
use super::stats::{RefinementStats, RefinementStop};
use super::swap::{SwapMove, SwapState};
use super::termination::{RefinementScope, StepCountTermination, Termination, TimeTermination};

/// Local search over swaps of two members of different groups.
///
/// Each step evaluates every swap, keeps the accepted one with the largest
/// gain and applies it. The search stops at a local optimum or when any
/// termination fires.
#[derive(Debug)]
pub struct SwapLocalSearch<A: Acceptor> {
    acceptor: A,
    terminations: Vec<Box<dyn Termination>>,
}

impl SwapLocalSearch<HillClimbingAcceptor> {
    /// Hill climbing bounded by a step cap and an optional time limit.
    pub fn hill_climbing(max_steps: u64, time_limit: Option<Duration>) -> Self {
        let mut search = Self::new(HillClimbingAcceptor::new())
            .with_termination(StepCountTermination::new(max_steps));
        if let Some(limit) = time_limit {
            search = search.with_termination(TimeTermination::new(limit));
        }
        search
    }
}

impl<A: Acceptor> SwapLocalSearch<A> {
    pub fn new(acceptor: A) -> Self {
        Self {
            acceptor,
            terminations: Vec::new(),
        }
    }

    pub fn with_termination(mut self, termination: impl Termination + 'static) -> Self {
        self.terminations.push(Box::new(termination));
        self
    }

    fn stop_reason(&self, scope: &RefinementScope) -> Option<RefinementStop> {
        self.terminations
            .iter()
            .find(|t| t.is_terminated(scope))
            .map(|t| t.reason())
    }

    /// Refines `clusters` and reports what happened.
    pub fn run(&mut self, ctx: &PartitionContext, clusters: Clusters) -> (Clusters, RefinementStats) {
        let mut scope = RefinementScope::new();
        let mut state = SwapState::new(ctx, clusters);
        let initial_objective = state.objective();
        let mut moves_evaluated = 0u64;

        self.acceptor.phase_started(initial_objective);

        let stop = loop {
            if let Some(reason) = self.stop_reason(&scope) {
                break reason;
            }

            let current = state.objective();
            let mut best: Option<(SwapMove, f64)> = None;
            for mv in state.moves() {
                moves_evaluated += 1;
                let delta = state.delta(mv);
                if !self.acceptor.is_accepted(current, current + delta) {
                    continue;
                }
                if best.map_or(true, |(_, d)| delta > d) {
                    best = Some((mv, delta));
                }
            }

            let Some((mv, delta)) = best else {
                break RefinementStop::LocalOptimum;
            };
            let step_score = state.apply(mv);
            self.acceptor.step_ended(step_score);
            scope.increment_step_count();
            trace!(
                event = "refine_step",
                step = scope.step_count(),
                a = mv.a,
                b = mv.b,
                delta,
                objective = step_score,
            );
        };

        let clusters = state.into_clusters();
        let stats = RefinementStats {
            steps: scope.step_count(),
            moves_evaluated,
            initial_objective,
            final_objective: objective(ctx, &clusters),
            elapsed_ms: scope.elapsed().as_millis() as u64,
            stop,
        };
        debug!(
            event = "refine_end",
            steps = stats.steps,
            moves_evaluated = stats.moves_evaluated,
            initial_objective = stats.initial_objective,
            final_objective = stats.final_objective,
            stop = ?stats.stop,
        );
        (clusters, stats)
    }
}
