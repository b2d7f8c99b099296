//! Trait compatibility scorer.

use tracing::warn;

use tripmate_config::ScoringConfig;
use tripmate_core::{
    validate_participants, CompatibilityScore, DimensionScore, Participant, Result,
    TraitDimension, TraitProfile, ValueQuality, MAX_SCORE, NEUTRAL_SCORE,
};

use crate::group::GroupCompatibility;
use crate::rules::SimilarityRules;
use crate::weights::DimensionWeights;

/// Result of comparing two bare profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileComparison {
    pub overall: f64,
    pub breakdown: Vec<DimensionScore>,
    pub confidence: f64,
}

/// Scores pairwise compatibility between trait profiles.
///
/// Scoring is a pure function of the two profiles: it is symmetric,
/// bounded to [0, 100] and never fails. Malformed input has already been
/// replaced by neutral defaults at the profile boundary, which only lowers
/// the reported confidence.
///
/// # Example
///
/// ```
/// use tripmate_core::{Participant, TraitDimension, TraitProfile};
/// use tripmate_scoring::TraitScorer;
///
/// let scorer = TraitScorer::default();
/// let a = Participant::new("a", TraitProfile::from_values(&[(TraitDimension::EnergyLevel, 80.0)]));
/// let b = Participant::new("b", TraitProfile::from_values(&[(TraitDimension::EnergyLevel, 20.0)]));
///
/// let score = scorer.score(&a, &b);
/// assert_eq!(score.overall, scorer.score(&b, &a).overall);
/// assert!((0.0..=100.0).contains(&score.overall));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TraitScorer {
    weights: DimensionWeights,
    rules: SimilarityRules,
}

impl TraitScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: DimensionWeights::default(),
            rules: SimilarityRules::new(config),
        }
    }

    pub fn with_weights(mut self, weights: DimensionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Scores two participants.
    pub fn score(&self, a: &Participant, b: &Participant) -> CompatibilityScore {
        let comparison = self.score_profiles(&a.profile, &b.profile);
        CompatibilityScore {
            participant_a: a.id.clone(),
            participant_b: b.id.clone(),
            overall: comparison.overall,
            breakdown: comparison.breakdown,
            confidence: comparison.confidence,
        }
    }

    /// Overall score only, without building a breakdown.
    pub fn overall(&self, a: &TraitProfile, b: &TraitProfile) -> f64 {
        if a.is_empty_signal() && b.is_empty_signal() {
            return NEUTRAL_SCORE;
        }
        let total: f64 = TraitDimension::ALL
            .into_iter()
            .map(|d| self.weights.get(d) * self.rules.similarity(d, a.get(d), b.get(d)))
            .sum();
        sanitize(total)
    }

    /// Compares two bare profiles.
    pub fn score_profiles(&self, a: &TraitProfile, b: &TraitProfile) -> ProfileComparison {
        let confidence = (a.confidence() + b.confidence()) / 2.0;

        // Nothing is known about either side.
        if a.is_empty_signal() && b.is_empty_signal() {
            let breakdown = TraitDimension::ALL
                .into_iter()
                .map(|d| DimensionScore {
                    dimension: d,
                    score: NEUTRAL_SCORE,
                    weight: self.weights.get(d),
                    defaulted: true,
                })
                .collect();
            return ProfileComparison {
                overall: NEUTRAL_SCORE,
                breakdown,
                confidence,
            };
        }

        let breakdown: Vec<DimensionScore> = TraitDimension::ALL
            .into_iter()
            .map(|d| DimensionScore {
                dimension: d,
                score: self.rules.similarity(d, a.get(d), b.get(d)),
                weight: self.weights.get(d),
                defaulted: a.quality(d) == ValueQuality::Defaulted
                    || b.quality(d) == ValueQuality::Defaulted,
            })
            .collect();

        let overall = sanitize(breakdown.iter().map(DimensionScore::contribution).sum());

        ProfileComparison {
            overall,
            breakdown,
            confidence,
        }
    }

    /// Average pairwise compatibility of a group.
    ///
    /// # Errors
    ///
    /// Returns a validation error for fewer than two participants or
    /// duplicate ids.
    pub fn group_compatibility(&self, participants: &[Participant]) -> Result<GroupCompatibility> {
        validate_participants(participants)?;
        let mut pair_scores = Vec::with_capacity(participants.len() * (participants.len() - 1) / 2);
        for (i, a) in participants.iter().enumerate() {
            for b in &participants[i + 1..] {
                pair_scores.push(self.score(a, b));
            }
        }
        Ok(GroupCompatibility::from_pairs(pair_scores))
    }
}

fn sanitize(total: f64) -> f64 {
    if total.is_finite() {
        total.clamp(0.0, MAX_SCORE)
    } else {
        warn!(
            event = "score_degraded",
            degraded = true,
            "non-finite compatibility score replaced by neutral score"
        );
        NEUTRAL_SCORE
    }
}

#[cfg(test)]
#[path = "scorer_tests.rs"]
mod tests;
