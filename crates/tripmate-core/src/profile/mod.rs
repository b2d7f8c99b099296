//! Trait profiles and the raw-input normalization boundary.
//!
//! Raw trait data arrives loosely typed: values may be missing, textual,
//! out of range or not numbers at all. [`TraitProfile::normalize`] converts
//! any [`RawProfile`] into a fully populated profile so that scoring and
//! clustering never have to deal with absent values.

mod dimension;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use dimension::{TraitDimension, UnknownDimension, MAX_AGE};

/// Value substituted for missing or unusable trait data.
pub const NEUTRAL_VALUE: f64 = 50.0;

/// How a normalized value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueQuality {
    /// Valid in-range number.
    Provided,
    /// Numeric but outside the dimension range; clamped.
    Clamped,
    /// Missing or not numeric; replaced by [`NEUTRAL_VALUE`].
    Defaulted,
}

impl ValueQuality {
    /// Contribution of a value of this quality to profile confidence.
    pub fn confidence(self) -> f64 {
        match self {
            ValueQuality::Provided => 1.0,
            ValueQuality::Clamped => 0.75,
            ValueQuality::Defaulted => 0.0,
        }
    }
}

/// Loosely-typed trait data keyed by dimension name.
///
/// Keys are matched case-insensitively and accept `snake_case`,
/// `camelCase` and `kebab-case` spellings. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawProfile(BTreeMap<String, Value>);

impl RawProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a raw profile from an arbitrary JSON value.
    ///
    /// Anything that is not a JSON object yields an empty profile.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn lookup(&self, dimension: TraitDimension) -> Option<&Value> {
        self.0
            .iter()
            .find(|(key, _)| canonical_key(key) == dimension.name())
            .map(|(_, value)| value)
    }
}

// "energyLevel" / "Energy-Level" -> "energy_level"
fn canonical_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            out.push('_');
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// A fully populated, normalized trait profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitProfile {
    values: [f64; TraitDimension::COUNT],
    quality: [ValueQuality; TraitDimension::COUNT],
}

impl TraitProfile {
    /// A profile where every dimension is defaulted.
    pub fn neutral() -> Self {
        Self {
            values: [NEUTRAL_VALUE; TraitDimension::COUNT],
            quality: [ValueQuality::Defaulted; TraitDimension::COUNT],
        }
    }

    /// Normalizes raw trait data. Never fails.
    pub fn normalize(raw: &RawProfile) -> Self {
        let mut profile = Self::neutral();
        for dimension in TraitDimension::ALL {
            if let Some(n) = raw.lookup(dimension).and_then(numeric) {
                profile.set(dimension, n);
            }
        }
        profile
    }

    /// Builds a profile from typed values; unspecified dimensions are defaulted.
    ///
    /// # Examples
    ///
    /// ```
    /// use tripmate_core::profile::{TraitDimension, TraitProfile, ValueQuality};
    ///
    /// let profile = TraitProfile::from_values(&[
    ///     (TraitDimension::EnergyLevel, 80.0),
    ///     (TraitDimension::RiskTolerance, 140.0),
    /// ]);
    /// assert_eq!(profile.get(TraitDimension::EnergyLevel), 80.0);
    /// assert_eq!(profile.get(TraitDimension::RiskTolerance), 100.0);
    /// assert_eq!(profile.quality(TraitDimension::RiskTolerance), ValueQuality::Clamped);
    /// assert_eq!(profile.quality(TraitDimension::Age), ValueQuality::Defaulted);
    /// ```
    pub fn from_values(values: &[(TraitDimension, f64)]) -> Self {
        let mut profile = Self::neutral();
        for &(dimension, value) in values {
            if value.is_finite() {
                profile.set(dimension, value);
            }
        }
        profile
    }

    fn set(&mut self, dimension: TraitDimension, value: f64) {
        let (lo, hi) = dimension.range();
        let clamped = value.clamp(lo, hi);
        let i = dimension.index();
        self.values[i] = clamped;
        self.quality[i] = if clamped == value {
            ValueQuality::Provided
        } else {
            ValueQuality::Clamped
        };
    }

    pub fn get(&self, dimension: TraitDimension) -> f64 {
        self.values[dimension.index()]
    }

    pub fn quality(&self, dimension: TraitDimension) -> ValueQuality {
        self.quality[dimension.index()]
    }

    /// Mean per-dimension confidence in [0, 1].
    pub fn confidence(&self) -> f64 {
        let total: f64 = self.quality.iter().map(|q| q.confidence()).sum();
        total / TraitDimension::COUNT as f64
    }

    /// Number of dimensions that fell back to the neutral default.
    pub fn defaulted_count(&self) -> usize {
        self.quality
            .iter()
            .filter(|q| **q == ValueQuality::Defaulted)
            .count()
    }

    /// True when no dimension carries real data.
    pub fn is_empty_signal(&self) -> bool {
        self.defaulted_count() == TraitDimension::COUNT
    }

    /// Point in trait space with every axis in [0, 100].
    ///
    /// Age is rescaled from [0, MAX_AGE] so that no axis dominates distances.
    pub fn vector(&self) -> [f64; TraitDimension::COUNT] {
        let mut v = self.values;
        v[TraitDimension::Age.index()] *= 100.0 / MAX_AGE;
        v
    }
}

impl Default for TraitProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

impl From<&RawProfile> for TraitProfile {
    fn from(raw: &RawProfile) -> Self {
        Self::normalize(raw)
    }
}
