//! RSE registry interface.
//!
//! The link helpers only need four registry calls, so they depend on this
//! trait rather than on a concrete client. [`HttpRegistry`] talks to a
//! Rucio-compatible REST server; [`InMemoryRegistry`] backs the tests.

mod error;
mod http;
mod memory;
mod parse;

pub use error::RegistryError;
pub use http::HttpRegistry;
pub use memory::{FailOn, InMemoryRegistry, RegistryCall};

use serde::{Deserialize, Serialize};

/// Directed distance between two RSEs as stored by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub distance: i64,
}

/// Minimal registry surface used by the link helpers.
pub trait RseRegistry {
    /// Names of all registered RSEs.
    fn list_rses(&mut self) -> Result<Vec<String>, RegistryError>;

    /// Distance `src -> dst`, if one is recorded.
    fn get_distance(&mut self, src: &str, dst: &str)
        -> Result<Option<DistanceRecord>, RegistryError>;

    /// Creates `src -> dst`. Fails with [`RegistryError::Duplicate`] if it exists.
    fn add_distance(&mut self, src: &str, dst: &str, distance: i64) -> Result<(), RegistryError>;

    /// Overwrites an existing `src -> dst`.
    fn update_distance(&mut self, src: &str, dst: &str, distance: i64)
        -> Result<(), RegistryError>;
}
