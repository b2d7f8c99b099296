//! Precomputed inputs shared by every strategy.

use tripmate_core::{Participant, ParticipantId, TraitDimension};
use tripmate_scoring::{CompatibilityMatrix, ConflictDetector, TraitScorer};

use crate::balance::{balance_plan, group_count};
use crate::cancel::CancelFlag;

/// Index-based view of one partition problem.
///
/// Participants are addressed by their position in the input slice. The
/// context owns all derived data so it can be moved onto a worker thread.
#[derive(Debug, Clone)]
pub struct PartitionContext {
    ids: Vec<ParticipantId>,
    vectors: Vec<[f64; TraitDimension::COUNT]>,
    matrix: CompatibilityMatrix,
    penalties: Vec<f64>,
    penalty_weight: f64,
    avoid_conflicts: bool,
    plan: Vec<usize>,
    cancel: CancelFlag,
}

impl PartitionContext {
    pub fn new(
        participants: &[Participant],
        scorer: &TraitScorer,
        detector: &ConflictDetector,
        target_group_size: usize,
        penalty_weight: f64,
        avoid_conflicts: bool,
    ) -> Self {
        let n = participants.len();
        let matrix = CompatibilityMatrix::compute(scorer, participants);

        let mut penalties = vec![0.0; n * n];
        for i in 0..n {
            for j in i + 1..n {
                let p = detector.pair_penalty(&participants[i].profile, &participants[j].profile);
                penalties[i * n + j] = p;
                penalties[j * n + i] = p;
            }
        }

        Self {
            ids: participants.iter().map(|p| p.id.clone()).collect(),
            vectors: participants.iter().map(|p| p.profile.vector()).collect(),
            matrix,
            penalties,
            penalty_weight,
            avoid_conflicts,
            plan: balance_plan(n, group_count(n, target_group_size)),
            cancel: CancelFlag::default(),
        }
    }

    /// Lets strategies observe `cancel`.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[ParticipantId] {
        &self.ids
    }

    pub fn matrix(&self) -> &CompatibilityMatrix {
        &self.matrix
    }

    /// Group sizes, largest first.
    pub fn plan(&self) -> &[usize] {
        &self.plan
    }

    pub fn group_count(&self) -> usize {
        self.plan.len()
    }

    pub fn max_group_size(&self) -> usize {
        self.plan.first().copied().unwrap_or(0)
    }

    pub fn penalty_weight(&self) -> f64 {
        self.penalty_weight
    }

    pub fn avoid_conflicts(&self) -> bool {
        self.avoid_conflicts
    }

    pub fn vector(&self, i: usize) -> &[f64; TraitDimension::COUNT] {
        &self.vectors[i]
    }

    #[inline]
    pub fn score(&self, i: usize, j: usize) -> f64 {
        self.matrix.get(i, j)
    }

    #[inline]
    pub fn penalty(&self, i: usize, j: usize) -> f64 {
        self.penalties[i * self.ids.len() + j]
    }

    /// Pair attraction used when growing clusters.
    ///
    /// Conflicts only reduce linkage when the caller asked to avoid them.
    #[inline]
    pub fn linkage(&self, i: usize, j: usize) -> f64 {
        if self.avoid_conflicts {
            self.score(i, j) - self.penalty_weight * self.penalty(i, j)
        } else {
            self.score(i, j)
        }
    }
}

/// Squared euclidean distance in trait space.
pub fn distance_sq(a: &[f64; TraitDimension::COUNT], b: &[f64; TraitDimension::COUNT]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
