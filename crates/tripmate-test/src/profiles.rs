//! Trait profile builders.

use tripmate_core::{Participant, TraitDimension, TraitProfile};

/// Builds a profile from `(dimension, value)` pairs; other dimensions are defaulted.
pub fn profile(values: &[(TraitDimension, f64)]) -> TraitProfile {
    TraitProfile::from_values(values)
}

/// Builds a fully provided profile.
///
/// Arguments follow [`TraitDimension::ALL`] order.
#[allow(clippy::too_many_arguments)]
pub fn full_profile(
    energy: f64,
    social: f64,
    adventure: f64,
    risk: f64,
    planning: f64,
    communication: f64,
    experience: f64,
    leadership: f64,
    age: f64,
) -> TraitProfile {
    let values = [
        energy,
        social,
        adventure,
        risk,
        planning,
        communication,
        experience,
        leadership,
        age,
    ];
    let pairs: Vec<(TraitDimension, f64)> = TraitDimension::ALL.into_iter().zip(values).collect();
    TraitProfile::from_values(&pairs)
}

/// Every trait dimension set to `value`, plus the given age.
pub fn uniform_profile(value: f64, age: f64) -> TraitProfile {
    full_profile(value, value, value, value, value, value, value, value, age)
}

/// Builds a participant from `(dimension, value)` pairs.
pub fn participant(id: &str, values: &[(TraitDimension, f64)]) -> Participant {
    Participant::new(id, profile(values))
}
