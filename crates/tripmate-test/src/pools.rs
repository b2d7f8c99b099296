//! Seeded participant pools.
//!
//! All pools are deterministic for a given seed so that tests can compare
//! repeated runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use tripmate_core::{Participant, ParticipantId, RawProfile, TraitDimension, TraitProfile};

use crate::profiles::participant;

fn pool_id(i: usize) -> String {
    format!("p{i:03}")
}

fn random_values(rng: &mut ChaCha8Rng) -> Vec<(TraitDimension, f64)> {
    TraitDimension::ALL
        .into_iter()
        .map(|d| {
            let value = match d {
                TraitDimension::Age => rng.random_range(18.0..70.0),
                _ => rng.random_range(0.0..100.0),
            };
            (d, value)
        })
        .collect()
}

/// `n` participants with uniformly random, fully provided profiles.
pub fn random_pool(n: usize, seed: u64) -> Vec<Participant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| Participant::new(pool_id(i), TraitProfile::from_values(&random_values(&mut rng))))
        .collect()
}

/// `clusters × per_cluster` participants drawn tightly around distinct centers.
///
/// Participant `i` belongs to cluster `i / per_cluster`.
pub fn clustered_pool(clusters: usize, per_cluster: usize, seed: u64) -> Vec<Participant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pool = Vec::with_capacity(clusters * per_cluster);
    for c in 0..clusters {
        let center = if clusters > 1 {
            10.0 + 80.0 * c as f64 / (clusters - 1) as f64
        } else {
            50.0
        };
        let age_center = 20.0 + 10.0 * c as f64;
        for _ in 0..per_cluster {
            let values: Vec<(TraitDimension, f64)> = TraitDimension::ALL
                .into_iter()
                .map(|d| {
                    let value = match d {
                        TraitDimension::Age => age_center + rng.random_range(-2.0..2.0),
                        // moderate leadership avoids the strong-leader rules
                        TraitDimension::LeadershipStyle => 50.0 + rng.random_range(-5.0..5.0),
                        _ => center + rng.random_range(-4.0..4.0),
                    };
                    (d, value)
                })
                .collect();
            pool.push(Participant::new(pool_id(pool.len()), TraitProfile::from_values(&values)));
        }
    }
    pool
}

/// One participant per leadership value, every other dimension defaulted.
pub fn leaders(values: &[f64]) -> Vec<Participant> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| participant(&format!("leader{i}"), &[(TraitDimension::LeadershipStyle, v)]))
        .collect()
}

/// Loosely-typed profiles as a profile provider would hand them out.
///
/// Every fifth entry carries malformed values.
pub fn raw_pool(n: usize, seed: u64) -> Vec<(ParticipantId, RawProfile)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let mut raw = RawProfile::new();
            for (d, v) in random_values(&mut rng) {
                raw.insert(d.name(), v);
            }
            if i % 5 == 4 {
                raw.insert("energy_level", json!("unknown"));
                raw.insert("risk_tolerance", json!(-40));
            }
            (ParticipantId::new(pool_id(i)), raw)
        })
        .collect()
}
