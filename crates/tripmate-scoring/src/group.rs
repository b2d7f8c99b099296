//! Aggregate compatibility of a participant group.

use serde::{Deserialize, Serialize};

use tripmate_core::{CompatibilityScore, NEUTRAL_SCORE};

/// Mean pairwise compatibility of a group plus the pair scores behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCompatibility {
    /// Mean of all pair scores; neutral for a group without pairs.
    pub average_score: f64,
    pub pair_scores: Vec<CompatibilityScore>,
    pub min_pair: Option<f64>,
    pub max_pair: Option<f64>,
}

impl GroupCompatibility {
    pub fn from_pairs(pair_scores: Vec<CompatibilityScore>) -> Self {
        let (sum, min, max) = pair_scores.iter().fold(
            (0.0, None::<f64>, None::<f64>),
            |(sum, min, max), s| {
                (
                    sum + s.overall,
                    Some(min.map_or(s.overall, |m| m.min(s.overall))),
                    Some(max.map_or(s.overall, |m| m.max(s.overall))),
                )
            },
        );
        let average_score = if pair_scores.is_empty() {
            NEUTRAL_SCORE
        } else {
            sum / pair_scores.len() as f64
        };
        Self {
            average_score,
            pair_scores,
            min_pair: min,
            max_pair: max,
        }
    }

    pub fn pair_count(&self) -> usize {
        self.pair_scores.len()
    }
}
