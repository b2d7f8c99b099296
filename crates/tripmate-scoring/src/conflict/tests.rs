use approx::assert_relative_eq;
use tripmate_config::{ConflictConfig, SeverityThresholds};
use tripmate_core::{TraitDimension, TripmateError};
use tripmate_test::{leaders, participant, uniform_profile};

use super::*;

#[test]
fn test_strong_leaders_are_flagged() {
    let detector = ConflictDetector::default();
    let group = leaders(&[90.0, 85.0, 15.0]);

    let report = detector.detect(&group, &ConflictOptions::default()).unwrap();

    assert_eq!(report.pair_count, 3);
    assert_eq!(report.leadership.len(), 1);
    let clash = &report.leadership[0];
    assert_eq!(clash.participant_a.as_str(), "leader0");
    assert_eq!(clash.participant_b.as_str(), "leader1");
    assert_eq!(clash.severity, Severity::Critical);
    assert_eq!(clash.magnitude, 85.0);
    assert!(report.overall_risk > 0.5);
    assert_eq!(report.flagged_pairs, 1);
}

#[test]
fn test_leader_and_follower_do_not_clash() {
    let detector = ConflictDetector::default();
    let report = detector
        .detect(&leaders(&[95.0, 20.0]), &ConflictOptions::default())
        .unwrap();
    assert!(report.is_empty());
    assert_eq!(report.overall_risk, 0.0);
}

#[test]
fn test_leaders_at_the_cutoff_do_not_clash() {
    let detector = ConflictDetector::default();
    let pair = leaders(&[75.0, 75.0]);

    let report = detector.detect(&pair, &ConflictOptions::default()).unwrap();
    assert!(report.leadership.is_empty());

    // The leadership similarity agrees: no clash at the threshold.
    let score = crate::TraitScorer::default().score(&pair[0], &pair[1]);
    let leadership = score.dimension(TraitDimension::LeadershipStyle).unwrap();
    assert_relative_eq!(leadership.score, 100.0);

    let above = detector
        .detect(&leaders(&[75.5, 90.0]), &ConflictOptions::default())
        .unwrap();
    assert_eq!(above.leadership.len(), 1);
    assert_eq!(above.leadership[0].severity, Severity::Minor);
}

#[test]
fn test_gap_severity_bands() {
    let detector = ConflictDetector::default();
    let base = participant("base", &[(TraitDimension::EnergyLevel, 10.0)]);
    let cases = [
        (45.0, None),
        (50.0, Some(Severity::Minor)),
        (65.0, Some(Severity::Major)),
        (80.0, Some(Severity::Critical)),
    ];
    for (energy, expected) in cases {
        let other = participant("other", &[(TraitDimension::EnergyLevel, energy)]);
        let found = detector
            .evaluate_pair(&base, &other)
            .into_iter()
            .find(|c| c.category == ConflictCategory::Energy)
            .map(|c| c.severity);
        assert_eq!(found, expected, "energy {energy}");
    }
}

#[test]
fn test_risk_uses_wider_bands() {
    let detector = ConflictDetector::default();
    let a = participant("a", &[(TraitDimension::RiskTolerance, 10.0)]);
    let b = participant("b", &[(TraitDimension::RiskTolerance, 55.0)]);
    assert!(detector.evaluate_pair(&a, &b).is_empty());

    let c = participant("c", &[(TraitDimension::RiskTolerance, 95.0)]);
    let conflicts = detector.evaluate_pair(&a, &c);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].category, ConflictCategory::Risk);
    assert_eq!(conflicts[0].severity, Severity::Critical);
}

#[test]
fn test_options_filter_categories_and_severity() {
    let detector = ConflictDetector::default();
    let mut group = leaders(&[90.0, 78.0]);
    group.push(participant(
        "quiet",
        &[(TraitDimension::SocialPreference, 0.0)],
    ));
    group.push(participant(
        "loud",
        &[(TraitDimension::SocialPreference, 100.0)],
    ));

    let all = detector.detect(&group, &ConflictOptions::default()).unwrap();
    assert_eq!(all.leadership.len(), 1);
    assert_eq!(all.leadership[0].severity, Severity::Minor);
    assert!(!all.social.is_empty());

    let critical_only = detector
        .detect(
            &group,
            &ConflictOptions::new().with_min_severity(Severity::Critical),
        )
        .unwrap();
    assert!(critical_only.leadership.is_empty());
    assert_eq!(critical_only.social.len(), 1);

    let leadership_only = detector
        .detect(
            &group,
            &ConflictOptions::new().with_categories([ConflictCategory::Leadership]),
        )
        .unwrap();
    assert_eq!(leadership_only.conflict_count(), 1);
    assert_eq!(leadership_only.flagged_pairs, 1);
}

#[test]
fn test_overall_risk_is_normalized() {
    assert_eq!(overall_risk(0.0, 10), 0.0);
    assert_relative_eq!(overall_risk(1.2, 6), 0.4);
    assert_eq!(overall_risk(3.0, 2), 1.0);
    assert_eq!(overall_risk(0.3, 1), 0.3);
}

#[test]
fn test_pair_penalty_sums_weights() {
    let detector = ConflictDetector::default();
    let a = uniform_profile(0.0, 30.0);
    let b = uniform_profile(100.0, 30.0);
    // energy, social and risk all critical; one leader only.
    assert_relative_eq!(detector.pair_penalty(&a, &b), 3.0);
    assert_eq!(detector.pair_penalty(&a, &a), 0.0);
}

#[test]
fn test_custom_thresholds() {
    let config = ConflictConfig {
        energy: SeverityThresholds::new(10.0, 20.0, 30.0),
        ..ConflictConfig::default()
    };
    let detector = ConflictDetector::new(&config);
    let a = participant("a", &[(TraitDimension::EnergyLevel, 50.0)]);
    let b = participant("b", &[(TraitDimension::EnergyLevel, 72.0)]);

    let conflicts = detector.evaluate_pair(&a, &b);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].severity, Severity::Major);
}

#[test]
fn test_detect_validates_input() {
    let detector = ConflictDetector::default();
    let err = detector
        .detect(&leaders(&[80.0]), &ConflictOptions::default())
        .unwrap_err();
    assert!(matches!(err, TripmateError::Validation(_)));
}

#[test]
fn test_summary_counts() {
    let detector = ConflictDetector::default();
    let report = detector
        .detect(&leaders(&[90.0, 88.0, 86.0]), &ConflictOptions::default())
        .unwrap();
    let summary = report.summary();
    assert_eq!(summary.critical, 3);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.overall_risk, 1.0);
    assert_eq!(report.max_severity(), Some(Severity::Critical));
}
