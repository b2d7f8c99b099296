//! Pairwise conflict rules.

use tracing::debug;

use tripmate_config::{ConflictConfig, SeverityThresholds};
use tripmate_core::{validate_participants, Participant, Result, TraitDimension, TraitProfile};

use super::report::{ConflictReport, PairConflict};
use super::severity::{ConflictCategory, Severity};

/// Filters applied to a conflict report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictOptions {
    /// Conflicts below this severity are not reported.
    pub min_severity: Severity,
    /// Categories to evaluate; `None` evaluates all of them.
    pub categories: Option<Vec<ConflictCategory>>,
}

impl ConflictOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = ConflictCategory>) -> Self {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    fn accepts(&self, category: ConflictCategory, severity: Severity) -> bool {
        severity >= self.min_severity
            && self
                .categories
                .as_ref()
                .map_or(true, |c| c.contains(&category))
    }
}

impl Default for ConflictOptions {
    fn default() -> Self {
        Self {
            min_severity: Severity::Minor,
            categories: None,
        }
    }
}

/// One rule hit before participant ids are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finding {
    pub category: ConflictCategory,
    pub severity: Severity,
    pub magnitude: f64,
}

/// Flags interpersonal risk between participants.
///
/// Four independent rules run on every unordered pair: energy gap, social
/// gap, risk-tolerance gap and a strong-leader clash. Each rule yields at
/// most one finding per pair.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: ConflictConfig,
}

impl ConflictDetector {
    pub fn new(config: &ConflictConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Findings for a single pair of profiles, in category order.
    pub fn evaluate(&self, a: &TraitProfile, b: &TraitProfile) -> Vec<Finding> {
        let gap = |d: TraitDimension| (a.get(d) - b.get(d)).abs();
        let weaker_leader = a
            .get(TraitDimension::LeadershipStyle)
            .min(b.get(TraitDimension::LeadershipStyle));

        let checks: [(ConflictCategory, f64, &SeverityThresholds); 4] = [
            (
                ConflictCategory::Energy,
                gap(TraitDimension::EnergyLevel),
                &self.config.energy,
            ),
            (
                ConflictCategory::Social,
                gap(TraitDimension::SocialPreference),
                &self.config.social,
            ),
            (ConflictCategory::Leadership, weaker_leader, &self.config.leadership),
            (
                ConflictCategory::Risk,
                gap(TraitDimension::RiskTolerance),
                &self.config.risk,
            ),
        ];

        checks
            .into_iter()
            // Leaders clash only above the cutoff, as in the leadership similarity rule.
            .filter(|(category, magnitude, thresholds)| {
                *category != ConflictCategory::Leadership || *magnitude > thresholds.minor
            })
            .filter_map(|(category, magnitude, thresholds)| {
                Severity::classify(magnitude, thresholds).map(|severity| Finding {
                    category,
                    severity,
                    magnitude,
                })
            })
            .collect()
    }

    /// Conflicts between two participants.
    pub fn evaluate_pair(&self, a: &Participant, b: &Participant) -> Vec<PairConflict> {
        self.evaluate(&a.profile, &b.profile)
            .into_iter()
            .map(|f| PairConflict {
                participant_a: a.id.clone(),
                participant_b: b.id.clone(),
                category: f.category,
                severity: f.severity,
                magnitude: f.magnitude,
            })
            .collect()
    }

    /// Summed severity weight of every finding for one pair.
    pub fn pair_penalty(&self, a: &TraitProfile, b: &TraitProfile) -> f64 {
        self.evaluate(a, b).iter().map(|f| f.severity.weight()).sum()
    }

    /// Evaluates every unordered pair of `participants`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for fewer than two participants or
    /// duplicate ids.
    pub fn detect(
        &self,
        participants: &[Participant],
        options: &ConflictOptions,
    ) -> Result<ConflictReport> {
        let n = validate_participants(participants)?;
        let mut report = ConflictReport::default();
        let mut weight = 0.0;

        for (i, a) in participants.iter().enumerate() {
            for b in &participants[i + 1..] {
                report.pair_count += 1;
                let mut flagged = false;
                for conflict in self.evaluate_pair(a, b) {
                    if !options.accepts(conflict.category, conflict.severity) {
                        continue;
                    }
                    flagged = true;
                    weight += conflict.severity.weight();
                    report.push(conflict);
                }
                if flagged {
                    report.flagged_pairs += 1;
                }
            }
        }

        report.overall_risk = overall_risk(weight, n);
        debug!(
            event = "conflicts_detected",
            participants = n,
            conflicts = report.conflict_count(),
            flagged_pairs = report.flagged_pairs,
            overall_risk = report.overall_risk,
            "conflict detection finished"
        );
        Ok(report)
    }
}

/// Weighted conflict load normalized by the disjoint pairs `n` members can form.
pub fn overall_risk(total_weight: f64, n: usize) -> f64 {
    let disjoint_pairs = (n / 2).max(1) as f64;
    (total_weight / disjoint_pairs).min(1.0)
}
