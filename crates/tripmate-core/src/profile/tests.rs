//! Tests for profile normalization.

use approx::assert_relative_eq;
use serde_json::json;

use super::*;

#[test]
fn test_normalize_full_profile() {
    let raw = RawProfile::from_json(json!({
        "energy_level": 70,
        "social_preference": 40.5,
        "adventure_style": 60,
        "risk_tolerance": 30,
        "planning_style": 80,
        "communication_style": 55,
        "experience_level": 65,
        "leadership_style": 20,
        "age": 34
    }));

    let profile = TraitProfile::normalize(&raw);
    assert_eq!(profile.get(TraitDimension::SocialPreference), 40.5);
    assert_eq!(profile.get(TraitDimension::Age), 34.0);
    assert_eq!(profile.defaulted_count(), 0);
    assert_relative_eq!(profile.confidence(), 1.0);
}

#[test]
fn test_missing_values_default_to_neutral() {
    let raw = RawProfile::new().with("energy_level", 90);
    let profile = TraitProfile::normalize(&raw);

    assert_eq!(profile.get(TraitDimension::EnergyLevel), 90.0);
    assert_eq!(profile.get(TraitDimension::RiskTolerance), NEUTRAL_VALUE);
    assert_eq!(
        profile.quality(TraitDimension::RiskTolerance),
        ValueQuality::Defaulted
    );
    assert_eq!(profile.defaulted_count(), 8);
    assert_relative_eq!(profile.confidence(), 1.0 / 9.0);
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let raw = RawProfile::new()
        .with("energy_level", 250)
        .with("social_preference", -12)
        .with("age", 400);
    let profile = TraitProfile::normalize(&raw);

    assert_eq!(profile.get(TraitDimension::EnergyLevel), 100.0);
    assert_eq!(profile.get(TraitDimension::SocialPreference), 0.0);
    assert_eq!(profile.get(TraitDimension::Age), MAX_AGE);
    assert_eq!(
        profile.quality(TraitDimension::EnergyLevel),
        ValueQuality::Clamped
    );
}

#[test]
fn test_non_numeric_values_are_defaulted() {
    let raw = RawProfile::from_json(json!({
        "energy_level": "very high",
        "social_preference": null,
        "adventure_style": true,
        "risk_tolerance": {"nested": 1},
        "planning_style": [1, 2],
    }));
    let profile = TraitProfile::normalize(&raw);

    for dimension in [
        TraitDimension::EnergyLevel,
        TraitDimension::SocialPreference,
        TraitDimension::AdventureStyle,
        TraitDimension::RiskTolerance,
        TraitDimension::PlanningStyle,
    ] {
        assert_eq!(profile.get(dimension), NEUTRAL_VALUE);
        assert_eq!(profile.quality(dimension), ValueQuality::Defaulted);
    }
    assert!(profile.is_empty_signal());
}

#[test]
fn test_numeric_strings_are_accepted() {
    let raw = RawProfile::new().with("risk_tolerance", " 72 ");
    let profile = TraitProfile::normalize(&raw);
    assert_eq!(profile.get(TraitDimension::RiskTolerance), 72.0);
    assert_eq!(
        profile.quality(TraitDimension::RiskTolerance),
        ValueQuality::Provided
    );
}

#[test]
fn test_key_spellings_are_canonicalized() {
    let raw = RawProfile::new()
        .with("energyLevel", 10)
        .with("SOCIAL_PREFERENCE", 20)
        .with("risk-tolerance", 30)
        .with("unrelated", 99);
    let profile = TraitProfile::normalize(&raw);

    assert_eq!(profile.get(TraitDimension::EnergyLevel), 10.0);
    assert_eq!(profile.get(TraitDimension::SocialPreference), 20.0);
    assert_eq!(profile.get(TraitDimension::RiskTolerance), 30.0);
}

#[test]
fn test_non_object_json_is_empty() {
    let profile = TraitProfile::normalize(&RawProfile::from_json(json!([1, 2, 3])));
    assert!(profile.is_empty_signal());
    assert_eq!(profile.confidence(), 0.0);
}

#[test]
fn test_vector_rescales_age() {
    let profile = TraitProfile::from_values(&[(TraitDimension::Age, 60.0)]);
    let v = profile.vector();
    assert_relative_eq!(v[TraitDimension::Age.index()], 50.0);
    assert!(v.iter().all(|x| (0.0..=100.0).contains(x)));
}

#[test]
fn test_from_values_ignores_non_finite() {
    let profile = TraitProfile::from_values(&[(TraitDimension::EnergyLevel, f64::NAN)]);
    assert_eq!(
        profile.quality(TraitDimension::EnergyLevel),
        ValueQuality::Defaulted
    );
}

#[test]
fn test_dimension_round_trips_through_name() {
    for dimension in TraitDimension::ALL {
        assert_eq!(dimension.name().parse::<TraitDimension>(), Ok(dimension));
    }
    assert!("height".parse::<TraitDimension>().is_err());
}
