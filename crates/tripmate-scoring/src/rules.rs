//! Per-dimension similarity rules.
//!
//! Most dimensions use plain distance similarity. Age and leadership have
//! non-linear rules: age only starts to matter beyond a soft gap, and two
//! strong leaders clash instead of matching.

use tripmate_config::ScoringConfig;
use tripmate_core::{TraitDimension, MAX_SCORE};

/// Similarity of an age pairing at the soft threshold.
const AGE_SCORE_AT_THRESHOLD: f64 = 90.0;

/// Upper bound of a strong-leader clash.
const LEADER_CLASH_MAX: f64 = 20.0;

/// Lower bound of a complementary leader / follower pairing.
const COMPLEMENTARY_BASE: f64 = 70.0;

/// Leadership value at or below which a participant counts as a follower.
const FOLLOWER_CEILING: f64 = 50.0;

/// Similarity rules parameterized by scoring configuration.
#[derive(Debug, Clone)]
pub struct SimilarityRules {
    age_soft_threshold: f64,
    strong_leader_threshold: f64,
}

impl SimilarityRules {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            age_soft_threshold: config.age_soft_threshold.max(1.0),
            strong_leader_threshold: config.strong_leader_threshold.clamp(0.0, 99.0),
        }
    }

    /// Similarity in [0, 100] of two normalized values along `dimension`.
    pub fn similarity(&self, dimension: TraitDimension, a: f64, b: f64) -> f64 {
        let score = match dimension {
            TraitDimension::Age => self.age(a, b),
            TraitDimension::LeadershipStyle => self.leadership(a, b),
            _ => linear(a, b),
        };
        score.clamp(0.0, MAX_SCORE)
    }

    fn age(&self, a: f64, b: f64) -> f64 {
        let gap = (a - b).abs();
        let t = self.age_soft_threshold;
        if gap <= t {
            MAX_SCORE - gap * (MAX_SCORE - AGE_SCORE_AT_THRESHOLD) / t
        } else {
            AGE_SCORE_AT_THRESHOLD * (-(gap - t) / t).exp()
        }
    }

    fn leadership(&self, a: f64, b: f64) -> f64 {
        let (lo, hi) = (a.min(b), a.max(b));
        let strong = self.strong_leader_threshold;
        if lo > strong {
            LEADER_CLASH_MAX * (MAX_SCORE - lo) / (MAX_SCORE - strong)
        } else if hi > strong && lo <= FOLLOWER_CEILING {
            COMPLEMENTARY_BASE + (MAX_SCORE - COMPLEMENTARY_BASE) * (hi - lo) / MAX_SCORE
        } else {
            linear(a, b)
        }
    }
}

impl Default for SimilarityRules {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

fn linear(a: f64, b: f64) -> f64 {
    MAX_SCORE - (a - b).abs()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_linear_dimensions() {
        let rules = SimilarityRules::default();
        assert_eq!(rules.similarity(TraitDimension::EnergyLevel, 30.0, 70.0), 60.0);
        assert_eq!(rules.similarity(TraitDimension::PlanningStyle, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_age_within_soft_threshold_is_near_maximal() {
        let rules = SimilarityRules::default();
        assert_eq!(rules.similarity(TraitDimension::Age, 30.0, 30.0), 100.0);
        assert_relative_eq!(rules.similarity(TraitDimension::Age, 30.0, 45.0), 90.0);
        assert!(rules.similarity(TraitDimension::Age, 30.0, 37.0) > 90.0);
    }

    #[test]
    fn test_age_decays_beyond_threshold() {
        let rules = SimilarityRules::default();
        let at_20 = rules.similarity(TraitDimension::Age, 20.0, 40.0);
        let at_40 = rules.similarity(TraitDimension::Age, 20.0, 60.0);
        assert!(at_20 < 90.0);
        assert!(at_40 < at_20);
        assert!(at_40 > 0.0);
    }

    #[test]
    fn test_two_strong_leaders_clash() {
        let rules = SimilarityRules::default();
        let clash = rules.similarity(TraitDimension::LeadershipStyle, 90.0, 85.0);
        let complementary = rules.similarity(TraitDimension::LeadershipStyle, 90.0, 15.0);
        assert!(clash <= LEADER_CLASH_MAX);
        assert!(complementary >= COMPLEMENTARY_BASE);
        assert!(clash < complementary);
    }

    #[test]
    fn test_leadership_is_symmetric() {
        let rules = SimilarityRules::default();
        for (a, b) in [(90.0, 85.0), (90.0, 15.0), (60.0, 40.0), (80.0, 60.0)] {
            assert_eq!(
                rules.similarity(TraitDimension::LeadershipStyle, a, b),
                rules.similarity(TraitDimension::LeadershipStyle, b, a)
            );
        }
    }
}
