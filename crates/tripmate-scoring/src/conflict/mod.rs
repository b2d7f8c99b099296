//! Interpersonal conflict detection.

mod detector;
mod report;
mod severity;

pub use detector::{overall_risk, ConflictDetector, ConflictOptions, Finding};
pub use report::{ConflictReport, ConflictSummary, PairConflict};
pub use severity::{ConflictCategory, Severity};

#[cfg(test)]
mod tests;
