//! Canonical cache keys.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use tripmate_core::ParticipantId;

/// SHA-256 fingerprint of a participant set and the configuration that
/// produced a result.
///
/// The participant set is sorted and de-duplicated before hashing, so the
/// key does not depend on input order.
///
/// ```
/// use tripmate_core::ParticipantId;
/// use tripmate_service::cache::CacheKey;
///
/// let ab = [ParticipantId::new("a"), ParticipantId::new("b")];
/// let ba = [ParticipantId::new("b"), ParticipantId::new("a")];
/// assert_eq!(
///     CacheKey::for_participants(&ab, "trait-v1"),
///     CacheKey::for_participants(&ba, "trait-v1"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_participants<'a>(
        ids: impl IntoIterator<Item = &'a ParticipantId>,
        config: &str,
    ) -> Self {
        let sorted: BTreeSet<&ParticipantId> = ids.into_iter().collect();
        let mut hasher = Sha256::new();
        // Length prefixes keep ("ab", "c") distinct from ("a", "bc").
        for id in sorted {
            let bytes = id.as_str().as_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        hasher.update(u64::MAX.to_le_bytes());
        hasher.update(config.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wraps an already computed key.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
