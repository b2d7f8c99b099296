//! Source of participant profiles.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use tripmate_core::{ParticipantId, RawProfile};

/// Failure of a profile source.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("participant source unavailable: {0}")]
    Unavailable(String),

    #[error("participant source failed: {0}")]
    Backend(String),
}

/// Looks up raw participant profiles by id.
#[async_trait]
pub trait ParticipantProvider: Send + Sync {
    /// Returns `Ok(None)` for an unknown id.
    async fn get_participant(&self, id: &ParticipantId) -> Result<Option<RawProfile>, ProviderError>;
}

/// Profiles held in memory.
#[derive(Debug, Default)]
pub struct InMemoryParticipantProvider {
    profiles: RwLock<HashMap<ParticipantId, RawProfile>>,
}

impl InMemoryParticipantProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<ParticipantId>, profile: RawProfile) {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        profiles.insert(id.into(), profile);
    }

    pub fn remove(&self, id: &ParticipantId) -> Option<RawProfile> {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        profiles.remove(id)
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(ParticipantId, RawProfile)> for InMemoryParticipantProvider {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, RawProfile)>>(iter: I) -> Self {
        Self {
            profiles: RwLock::new(iter.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ParticipantProvider for InMemoryParticipantProvider {
    async fn get_participant(&self, id: &ParticipantId) -> Result<Option<RawProfile>, ProviderError> {
        let profiles = self.profiles.read().unwrap_or_else(|e| e.into_inner());
        Ok(profiles.get(id).cloned())
    }
}
