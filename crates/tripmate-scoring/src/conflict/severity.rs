//! Conflict categories and severities.

use std::fmt;

use serde::{Deserialize, Serialize};

use tripmate_config::SeverityThresholds;

/// Severity of an interpersonal risk signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Contribution of one conflict of this severity to risk and penalties.
    pub fn weight(self) -> f64 {
        match self {
            Severity::Minor => 0.3,
            Severity::Major => 0.6,
            Severity::Critical => 1.0,
        }
    }

    /// Classifies `value` against ascending cutoffs.
    pub fn classify(value: f64, thresholds: &SeverityThresholds) -> Option<Severity> {
        if value >= thresholds.critical {
            Some(Severity::Critical)
        } else if value >= thresholds.major {
            Some(Severity::Major)
        } else if value >= thresholds.minor {
            Some(Severity::Minor)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        })
    }
}

/// Kind of interpersonal conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    /// Large gap in energy level.
    Energy,
    /// Large gap in social preference.
    Social,
    /// Two strong leaders in one group.
    Leadership,
    /// Large gap in risk tolerance.
    Risk,
}

impl ConflictCategory {
    pub const ALL: [ConflictCategory; 4] = [
        ConflictCategory::Energy,
        ConflictCategory::Social,
        ConflictCategory::Leadership,
        ConflictCategory::Risk,
    ];
}

impl fmt::Display for ConflictCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictCategory::Energy => "energy",
            ConflictCategory::Social => "social",
            ConflictCategory::Leadership => "leadership",
            ConflictCategory::Risk => "risk",
        })
    }
}
