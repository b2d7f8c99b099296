//! Compatibility score types.

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;
use crate::profile::TraitDimension;

/// Upper bound of every compatibility score.
pub const MAX_SCORE: f64 = 100.0;

/// Score of a dimension pairing that carries no information either way.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Similarity of two participants along a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: TraitDimension,
    /// Similarity in [0, 100].
    pub score: f64,
    /// Share of the overall score this dimension carries, in [0, 1].
    pub weight: f64,
    /// True when either side fell back to a neutral default.
    pub defaulted: bool,
}

impl DimensionScore {
    /// Weighted contribution to the overall score.
    pub fn contribution(&self) -> f64 {
        self.score * self.weight
    }
}

/// Pairwise compatibility between two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub participant_a: ParticipantId,
    pub participant_b: ParticipantId,
    /// Weighted aggregate in [0, 100].
    pub overall: f64,
    pub breakdown: Vec<DimensionScore>,
    /// Confidence in [0, 1] derived from how many values were defaulted.
    pub confidence: f64,
}

impl CompatibilityScore {
    /// Returns true if this score relates the two given participants,
    /// in either order.
    pub fn involves_pair(&self, a: &ParticipantId, b: &ParticipantId) -> bool {
        (&self.participant_a == a && &self.participant_b == b)
            || (&self.participant_a == b && &self.participant_b == a)
    }

    pub fn dimension(&self, dimension: TraitDimension) -> Option<&DimensionScore> {
        self.breakdown.iter().find(|d| d.dimension == dimension)
    }
}
