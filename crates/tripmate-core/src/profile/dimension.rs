//! Trait dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named personality or preference dimension of a traveler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitDimension {
    EnergyLevel,
    SocialPreference,
    AdventureStyle,
    RiskTolerance,
    PlanningStyle,
    CommunicationStyle,
    ExperienceLevel,
    LeadershipStyle,
    Age,
}

impl TraitDimension {
    /// All dimensions in canonical order.
    pub const ALL: [TraitDimension; 9] = [
        TraitDimension::EnergyLevel,
        TraitDimension::SocialPreference,
        TraitDimension::AdventureStyle,
        TraitDimension::RiskTolerance,
        TraitDimension::PlanningStyle,
        TraitDimension::CommunicationStyle,
        TraitDimension::ExperienceLevel,
        TraitDimension::LeadershipStyle,
        TraitDimension::Age,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this dimension in [`TraitDimension::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TraitDimension::EnergyLevel => "energy_level",
            TraitDimension::SocialPreference => "social_preference",
            TraitDimension::AdventureStyle => "adventure_style",
            TraitDimension::RiskTolerance => "risk_tolerance",
            TraitDimension::PlanningStyle => "planning_style",
            TraitDimension::CommunicationStyle => "communication_style",
            TraitDimension::ExperienceLevel => "experience_level",
            TraitDimension::LeadershipStyle => "leadership_style",
            TraitDimension::Age => "age",
        }
    }

    /// Inclusive value range after normalization.
    pub fn range(self) -> (f64, f64) {
        match self {
            TraitDimension::Age => (0.0, MAX_AGE),
            _ => (0.0, 100.0),
        }
    }
}

/// Upper bound for normalized ages.
pub const MAX_AGE: f64 = 120.0;

impl fmt::Display for TraitDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown dimension name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDimension(pub String);

impl fmt::Display for UnknownDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown trait dimension '{}'", self.0)
    }
}

impl std::error::Error for UnknownDimension {}

impl FromStr for TraitDimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraitDimension::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}
