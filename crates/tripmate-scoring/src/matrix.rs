//! Symmetric compatibility matrix.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use tripmate_core::{CompatibilityScore, Participant, ParticipantId, MAX_SCORE};

use crate::scorer::TraitScorer;

/// Participant count from which rows are scored in parallel.
const PARALLEL_THRESHOLD: usize = 64;

/// Symmetric n×n grid of pairwise scores with a diagonal of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    ids: Vec<ParticipantId>,
    values: Vec<f64>,
}

impl CompatibilityMatrix {
    /// Scores every pair of `participants`.
    ///
    /// Rows are scored on the rayon pool once the input is large enough.
    pub fn compute(scorer: &TraitScorer, participants: &[Participant]) -> Self {
        let n = participants.len();
        let row = |i: usize| -> Vec<f64> {
            let a = &participants[i];
            participants[i + 1..]
                .iter()
                .map(|b| scorer.overall(&a.profile, &b.profile))
                .collect()
        };
        let upper: Vec<Vec<f64>> = if n >= PARALLEL_THRESHOLD {
            (0..n).into_par_iter().map(row).collect()
        } else {
            (0..n).map(row).collect()
        };

        let mut matrix = Self::identity(participants.iter().map(|p| p.id.clone()).collect());
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, value) in row.into_iter().enumerate() {
                matrix.set(i, i + 1 + offset, value);
            }
        }
        matrix
    }

    /// Builds a matrix from already computed pair scores.
    ///
    /// Pairs referring to unknown ids are ignored; missing pairs stay 0.
    pub fn from_scores(ids: Vec<ParticipantId>, scores: &[CompatibilityScore]) -> Self {
        let index: HashMap<&ParticipantId, usize> =
            ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let positions: Vec<(usize, usize, f64)> = scores
            .iter()
            .filter_map(|s| {
                let i = *index.get(&s.participant_a)?;
                let j = *index.get(&s.participant_b)?;
                Some((i, j, s.overall))
            })
            .collect();

        let mut matrix = Self::identity(ids);
        for (i, j, value) in positions {
            matrix.set(i, j, value);
        }
        matrix
    }

    fn identity(ids: Vec<ParticipantId>) -> Self {
        let n = ids.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = MAX_SCORE;
        }
        Self { ids, values }
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let n = self.ids.len();
        self.values[i * n + j] = value;
        self.values[j * n + i] = value;
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

    /// Score between participants at positions `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.ids.len() + j]
    }

    pub fn get_by_id(&self, a: &ParticipantId, b: &ParticipantId) -> Option<f64> {
        let i = self.ids.iter().position(|id| id == a)?;
        let j = self.ids.iter().position(|id| id == b)?;
        Some(self.get(i, j))
    }

    /// Matrix as nested rows.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        let n = self.ids.len();
        if n == 0 {
            return Vec::new();
        }
        self.values.chunks(n).map(<[f64]>::to_vec).collect()
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.ids.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }
}
