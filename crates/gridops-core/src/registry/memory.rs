//! In-memory registry with a call log and injectable failures.

use super::{DistanceRecord, RegistryError, RseRegistry};
use std::collections::{BTreeMap, HashSet};

/// One call made against an [`InMemoryRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    ListRses,
    GetDistance { src: String, dst: String },
    AddDistance { src: String, dst: String, distance: i64 },
    UpdateDistance { src: String, dst: String, distance: i64 },
}

impl RegistryCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RegistryCall::AddDistance { .. } | RegistryCall::UpdateDistance { .. }
        )
    }
}

/// Operation to fail for a given pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    Get,
    Add,
    Update,
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    rses: Vec<String>,
    distances: BTreeMap<(String, String), i64>,
    failures: HashSet<(FailOn, String, String)>,
    fail_listing: bool,
    calls: Vec<RegistryCall>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rses<I, S>(rses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rses: rses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Seeds a distance without recording a call.
    pub fn set_distance(&mut self, src: &str, dst: &str, distance: i64) {
        self.distances
            .insert((src.to_string(), dst.to_string()), distance);
    }

    pub fn distance(&self, src: &str, dst: &str) -> Option<i64> {
        self.distances
            .get(&(src.to_string(), dst.to_string()))
            .copied()
    }

    /// Makes `op` on `src -> dst` fail with [`RegistryError::Other`].
    pub fn fail(&mut self, op: FailOn, src: &str, dst: &str) {
        self.failures.insert((op, src.to_string(), dst.to_string()));
    }

    pub fn fail_listing(&mut self) {
        self.fail_listing = true;
    }

    pub fn calls(&self) -> &[RegistryCall] {
        &self.calls
    }

    pub fn mutations(&self) -> Vec<&RegistryCall> {
        self.calls.iter().filter(|c| c.is_mutation()).collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn check(&self, op: FailOn, src: &str, dst: &str) -> Result<(), RegistryError> {
        if self
            .failures
            .contains(&(op, src.to_string(), dst.to_string()))
        {
            return Err(RegistryError::Other(format!(
                "injected {op:?} failure for {src} -> {dst}"
            )));
        }
        Ok(())
    }
}

impl RseRegistry for InMemoryRegistry {
    fn list_rses(&mut self) -> Result<Vec<String>, RegistryError> {
        self.calls.push(RegistryCall::ListRses);
        if self.fail_listing {
            return Err(RegistryError::Other("injected listing failure".to_string()));
        }
        Ok(self.rses.clone())
    }

    fn get_distance(
        &mut self,
        src: &str,
        dst: &str,
    ) -> Result<Option<DistanceRecord>, RegistryError> {
        self.calls.push(RegistryCall::GetDistance {
            src: src.to_string(),
            dst: dst.to_string(),
        });
        self.check(FailOn::Get, src, dst)?;
        Ok(self
            .distance(src, dst)
            .map(|distance| DistanceRecord { distance }))
    }

    fn add_distance(&mut self, src: &str, dst: &str, distance: i64) -> Result<(), RegistryError> {
        self.calls.push(RegistryCall::AddDistance {
            src: src.to_string(),
            dst: dst.to_string(),
            distance,
        });
        self.check(FailOn::Add, src, dst)?;
        let key = (src.to_string(), dst.to_string());
        if self.distances.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        self.distances.insert(key, distance);
        Ok(())
    }

    fn update_distance(
        &mut self,
        src: &str,
        dst: &str,
        distance: i64,
    ) -> Result<(), RegistryError> {
        self.calls.push(RegistryCall::UpdateDistance {
            src: src.to_string(),
            dst: dst.to_string(),
            distance,
        });
        self.check(FailOn::Update, src, dst)?;
        match self.distances.get_mut(&(src.to_string(), dst.to_string())) {
            Some(d) => {
                *d = distance;
                Ok(())
            }
            None => Err(RegistryError::Other(format!(
                "no distance from {src} to {dst} to update"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_duplicate() {
        let mut reg = InMemoryRegistry::with_rses(["A", "B"]);
        reg.add_distance("A", "B", 3).unwrap();
        let err = reg.add_distance("A", "B", 4).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(reg.distance("A", "B"), Some(3));
    }

    #[test]
    fn update_requires_existing() {
        let mut reg = InMemoryRegistry::new();
        assert!(reg.update_distance("A", "B", 1).is_err());
        reg.set_distance("A", "B", 1);
        reg.update_distance("A", "B", 9).unwrap();
        assert_eq!(reg.distance("A", "B"), Some(9));
    }

    #[test]
    fn injected_failure_and_call_log() {
        let mut reg = InMemoryRegistry::with_rses(["A"]);
        reg.fail(FailOn::Get, "A", "B");
        assert!(reg.get_distance("A", "B").is_err());
        assert_eq!(reg.get_distance("B", "A").unwrap(), None);
        assert_eq!(reg.calls().len(), 2);
        assert!(reg.mutations().is_empty());
    }
}
