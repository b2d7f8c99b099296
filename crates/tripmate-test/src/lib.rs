//! Shared test fixtures for Tripmate crates.
//!
//! This crate provides data builders and deterministic participant pools.
//! It only depends on `tripmate-core` so that every other crate can use it
//! as a dev-dependency without cycles.
//!
//! - [`profiles`] - trait profile builders
//! - [`pools`] - seeded participant pools (uniform and clustered)
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tripmate-test = { workspace = true }
//! ```
//!
//! ```
//! use tripmate_test::pools::random_pool;
//!
//! let pool = random_pool(12, 42);
//! assert_eq!(pool.len(), 12);
//! assert_eq!(pool, random_pool(12, 42));
//! ```

pub mod pools;
pub mod profiles;

pub use pools::{clustered_pool, leaders, raw_pool, random_pool};
pub use profiles::{full_profile, participant, profile, uniform_profile};
