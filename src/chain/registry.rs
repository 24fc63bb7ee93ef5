//! Backend registry
//!
//! Maps backend names to their factories, in configured order.

use anyhow::{bail, Result};
use std::sync::Arc;

use super::{ChainBackend, SimulatedBackend, SimulatedProfile};

/// Ordered set of named backends
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn ChainBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build simulated backends from profiles
    pub fn from_profiles(profiles: &[SimulatedProfile]) -> Self {
        let mut registry = Self::new();
        for profile in profiles {
            registry.register(Arc::new(SimulatedBackend::new(profile.clone())));
        }
        registry
    }

    /// Add a backend; a backend with the same name is replaced in place
    pub fn register(&mut self, backend: Arc<dyn ChainBackend>) {
        if let Some(existing) = self
            .backends
            .iter_mut()
            .find(|b| b.name().eq_ignore_ascii_case(backend.name()))
        {
            *existing = backend;
        } else {
            self.backends.push(backend);
        }
    }

    /// Look up a backend by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChainBackend>> {
        self.backends
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Restrict to the named backends, in the order given
    pub fn select(&self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        let mut selected = Self::new();
        for name in names {
            match self.get(name) {
                Some(backend) => selected.register(backend),
                None => bail!(
                    "Unknown backend: {name}. Available: {}",
                    self.names().join(", ")
                ),
            }
        }
        Ok(selected)
    }

    pub fn names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ChainBackend>> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
