//! Conflict reports.

use serde::{Deserialize, Serialize};

use tripmate_core::ParticipantId;

use super::severity::{ConflictCategory, Severity};

/// A flagged conflict between two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConflict {
    pub participant_a: ParticipantId,
    pub participant_b: ParticipantId,
    pub category: ConflictCategory,
    pub severity: Severity,
    /// The measured quantity: a trait gap, or the weaker leader's value.
    pub magnitude: f64,
}

/// Conflicts within a participant set, by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub energy: Vec<PairConflict>,
    pub social: Vec<PairConflict>,
    pub leadership: Vec<PairConflict>,
    pub risk: Vec<PairConflict>,
    /// Severity-weighted conflict load in [0, 1].
    pub overall_risk: f64,
    /// Unordered pairs examined.
    pub pair_count: usize,
    /// Pairs with at least one reported conflict.
    pub flagged_pairs: usize,
}

impl ConflictReport {
    pub(crate) fn push(&mut self, conflict: PairConflict) {
        match conflict.category {
            ConflictCategory::Energy => self.energy.push(conflict),
            ConflictCategory::Social => self.social.push(conflict),
            ConflictCategory::Leadership => self.leadership.push(conflict),
            ConflictCategory::Risk => self.risk.push(conflict),
        }
    }

    pub fn category(&self, category: ConflictCategory) -> &[PairConflict] {
        match category {
            ConflictCategory::Energy => &self.energy,
            ConflictCategory::Social => &self.social,
            ConflictCategory::Leadership => &self.leadership,
            ConflictCategory::Risk => &self.risk,
        }
    }

    /// All conflicts, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &PairConflict> {
        self.energy
            .iter()
            .chain(&self.social)
            .chain(&self.leadership)
            .chain(&self.risk)
    }

    pub fn conflict_count(&self) -> usize {
        self.energy.len() + self.social.len() + self.leadership.len() + self.risk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflict_count() == 0
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.iter().filter(|c| c.severity == severity).count()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.iter().map(|c| c.severity).max()
    }

    pub fn summary(&self) -> ConflictSummary {
        ConflictSummary {
            minor: self.count_by_severity(Severity::Minor),
            major: self.count_by_severity(Severity::Major),
            critical: self.count_by_severity(Severity::Critical),
            flagged_pairs: self.flagged_pairs,
            overall_risk: self.overall_risk,
        }
    }
}

/// Compact conflict counts attached to a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub minor: usize,
    pub major: usize,
    pub critical: usize,
    pub flagged_pairs: usize,
    pub overall_risk: f64,
}

impl ConflictSummary {
    pub fn total(&self) -> usize {
        self.minor + self.major + self.critical
    }
}
