//! Participant identity and input validation.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripmateError};
use crate::profile::{RawProfile, TraitProfile};

/// Opaque participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A participant with a normalized trait profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub profile: TraitProfile,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, profile: TraitProfile) -> Self {
        Self {
            id: id.into(),
            profile,
        }
    }

    /// Builds a participant from loosely-typed trait data.
    ///
    /// Never fails: unusable values fall back to neutral defaults.
    pub fn from_raw(id: impl Into<ParticipantId>, raw: &RawProfile) -> Self {
        Self::new(id, TraitProfile::normalize(raw))
    }
}

/// Minimum number of participants any multi-participant operation accepts.
pub const MIN_PARTICIPANTS: usize = 2;

/// Checks the shape of a participant id list.
///
/// # Errors
///
/// Returns [`TripmateError::Validation`] for an empty list, fewer than
/// [`MIN_PARTICIPANTS`] entries, or duplicate ids.
pub fn validate_ids<'a, I>(ids: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a ParticipantId>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(TripmateError::validation(format!(
                "duplicate participant id '{id}'"
            )));
        }
    }

    match seen.len() {
        0 => Err(TripmateError::validation("participant list is empty")),
        n if n < MIN_PARTICIPANTS => Err(TripmateError::validation(format!(
            "at least {MIN_PARTICIPANTS} participants are required, got {n}"
        ))),
        n => Ok(n),
    }
}

/// Checks a participant slice, see [`validate_ids`].
pub fn validate_participants(participants: &[Participant]) -> Result<usize> {
    validate_ids(participants.iter().map(|p| &p.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ParticipantId> {
        raw.iter().map(|s| ParticipantId::from(*s)).collect()
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_ids(&ids(&[])).unwrap_err();
        assert!(matches!(err, TripmateError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_single() {
        let err = validate_ids(&ids(&["a"])).unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = validate_ids(&ids(&["a", "b", "a"])).unwrap_err();
        assert!(err.to_string().contains("duplicate participant id 'a'"));
    }

    #[test]
    fn test_validate_accepts_distinct() {
        assert_eq!(validate_ids(&ids(&["a", "b", "c"])).unwrap(), 3);
    }

    #[test]
    fn test_participant_id_serializes_transparently() {
        let json = serde_json::to_string(&ParticipantId::new("p-1")).unwrap();
        assert_eq!(json, "\"p-1\"");
    }
}
