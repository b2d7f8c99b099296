//! Tripmate Core - Core types for traveler group compatibility
//!
//! This crate provides the fundamental abstractions shared by every other
//! Tripmate crate:
//! - Participant identity and input validation
//! - Trait dimensions and the raw-to-normalized profile boundary
//! - Compatibility score types
//! - The engine-wide error taxonomy

pub mod error;
pub mod participant;
pub mod profile;
pub mod score;

pub use error::{Result, TripmateError};
pub use participant::{validate_ids, validate_participants, Participant, ParticipantId};
pub use profile::{RawProfile, TraitDimension, TraitProfile, ValueQuality, NEUTRAL_VALUE};
pub use score::{CompatibilityScore, DimensionScore, MAX_SCORE, NEUTRAL_SCORE};
