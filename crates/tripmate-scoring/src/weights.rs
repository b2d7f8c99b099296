//! Dimension weights of the overall compatibility score.

use tripmate_core::TraitDimension;

/// Relative weight of every trait dimension, summing to 1.
///
/// The default groups dimensions into categories:
///
/// | category     | dimensions                          | share |
/// |--------------|-------------------------------------|-------|
/// | personality  | energy, social, communication       | 40%   |
/// | adventure    | adventure style, risk tolerance     | 20%   |
/// | travel style | planning style                      | 20%   |
/// | age          | age                                 | 10%   |
/// | leadership   | leadership style, experience level  | 10%   |
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionWeights {
    weights: [f64; TraitDimension::COUNT],
}

impl DimensionWeights {
    /// Creates weights from raw values, normalized to sum to 1.
    ///
    /// Returns `None` if any value is negative or non-finite, or all are zero.
    pub fn new(raw: [f64; TraitDimension::COUNT]) -> Option<Self> {
        if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let total: f64 = raw.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut weights = raw;
        for w in &mut weights {
            *w /= total;
        }
        Some(Self { weights })
    }

    pub fn get(&self, dimension: TraitDimension) -> f64 {
        self.weights[dimension.index()]
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        let personality = 40.0 / 3.0;
        let mut raw = [0.0; TraitDimension::COUNT];
        raw[TraitDimension::EnergyLevel.index()] = personality;
        raw[TraitDimension::SocialPreference.index()] = personality;
        raw[TraitDimension::CommunicationStyle.index()] = personality;
        raw[TraitDimension::AdventureStyle.index()] = 10.0;
        raw[TraitDimension::RiskTolerance.index()] = 10.0;
        raw[TraitDimension::PlanningStyle.index()] = 20.0;
        raw[TraitDimension::Age.index()] = 10.0;
        raw[TraitDimension::LeadershipStyle.index()] = 5.0;
        raw[TraitDimension::ExperienceLevel.index()] = 5.0;
        Self {
            weights: raw.map(|w| w / 100.0),
        }
    }
}
