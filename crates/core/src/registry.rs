use std::collections::BTreeMap;

use crate::{ConfigError, ParameterSpec};

/// An immutable catalog of parameter specs, keyed by name.
///
/// A registry is assembled once with a [`RegistryBuilder`], typically from
/// registration functions contributed by each method family, and is only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    specs: BTreeMap<&'static str, ParameterSpec>,
}

impl ParameterRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over all registered specs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.values()
    }

    /// Looks up the spec for every name, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParameter`] for the first name that is
    /// not registered.
    pub fn resolve(&self, names: &[&str]) -> Result<Vec<&ParameterSpec>, ConfigError> {
        names
            .iter()
            .map(|name| self.get(name).ok_or_else(|| ConfigError::unknown(name)))
            .collect()
    }
}

/// Collects parameter specs into a [`ParameterRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    specs: BTreeMap<&'static str, ParameterSpec>,
}

impl RegistryBuilder {
    /// Adds a spec.
    ///
    /// Registering a spec identical to one already present is a no-op, so
    /// families that share a parameter may each register it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateParameter`] if the name is registered
    /// with a different spec, or [`ConfigError::InvalidParameterValue`] if
    /// the spec's default violates its own kinds or constraint.
    pub fn register(&mut self, spec: ParameterSpec) -> Result<&mut Self, ConfigError> {
        if let Some(existing) = self.specs.get(spec.name()) {
            if *existing == spec {
                return Ok(self);
            }
            return Err(ConfigError::DuplicateParameter {
                name: spec.name().to_owned(),
            });
        }

        if let Some(default) = spec.default() {
            spec.check(default)?;
        }

        self.specs.insert(spec.name(), spec);
        Ok(self)
    }

    /// Adds several specs, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::register`].
    pub fn register_all(
        &mut self,
        specs: impl IntoIterator<Item = ParameterSpec>,
    ) -> Result<&mut Self, ConfigError> {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> ParameterRegistry {
        ParameterRegistry { specs: self.specs }
    }
}
