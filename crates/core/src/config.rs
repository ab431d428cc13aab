use std::collections::{BTreeMap, BTreeSet};

use crate::{ConfigError, ParameterRegistry, ParameterSpec, Value};

/// The parameter values of one solver instance.
///
/// A configuration is resolved from a required and an optional list of
/// parameter names against a [`ParameterRegistry`]. It only holds keys from
/// those lists, starts from the registered defaults, and validates every
/// assignment against the parameter's spec.
///
/// Assignments made through [`Configuration::set`] and
/// [`Configuration::set_many`] are recorded as explicit, so a method can
/// derive other values from them without overriding a user's choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    specs: BTreeMap<&'static str, ParameterSpec>,
    order: Vec<&'static str>,
    required: BTreeSet<&'static str>,
    values: BTreeMap<&'static str, Value>,
    explicit: BTreeSet<&'static str>,
}

impl Configuration {
    /// Resolves the parameter lists against a registry.
    ///
    /// A name listed more than once keeps its first position, and a name in
    /// both lists is required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParameter`] if any name is not registered.
    pub fn new(
        registry: &ParameterRegistry,
        required: &[&str],
        optional: &[&str],
    ) -> Result<Self, ConfigError> {
        let required_specs = registry.resolve(required)?;
        let optional_specs = registry.resolve(optional)?;

        let mut config = Self {
            specs: BTreeMap::new(),
            order: Vec::new(),
            required: required_specs.iter().map(|spec| spec.name()).collect(),
            values: BTreeMap::new(),
            explicit: BTreeSet::new(),
        };

        for spec in required_specs.into_iter().chain(optional_specs) {
            if config.specs.contains_key(spec.name()) {
                continue;
            }
            config.order.push(spec.name());
            if let Some(default) = spec.default() {
                config.values.insert(spec.name(), default.clone());
            }
            config.specs.insert(spec.name(), spec.clone());
        }

        Ok(config)
    }

    /// Iterates over the parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.get(name)
    }

    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Returns `true` if the value was assigned by the caller rather than
    /// taken from a default or derived by a method.
    #[must_use]
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    /// Validates and assigns a single value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParameter`] if the name is not part of
    /// this configuration, or [`ConfigError::InvalidParameterValue`] if the
    /// value fails its spec. On error nothing is changed.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        self.set_many([(name, value.into())])
    }

    /// Validates and assigns several values at once.
    ///
    /// Every entry is checked before any is stored, so a failure leaves the
    /// configuration untouched.
    ///
    /// # Errors
    ///
    /// See [`Configuration::set`].
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let checked = entries
            .into_iter()
            .map(|(name, value)| self.checked(name.as_ref(), value.into()))
            .collect::<Result<Vec<_>, _>>()?;

        for (name, value) in checked {
            self.values.insert(name, value);
            self.explicit.insert(name);
        }
        Ok(())
    }

    /// Validates and assigns a value derived by a method.
    ///
    /// Unlike [`Configuration::set`], the key is not marked explicit, so it
    /// may be derived again later.
    ///
    /// # Errors
    ///
    /// See [`Configuration::set`].
    pub fn set_derived(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let (name, value) = self.checked(name, value.into())?;
        self.values.insert(name, value);
        Ok(())
    }

    /// Returns the current value of a parameter, or `None` if it has neither
    /// a default nor an assigned value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParameter`] if the name is not part of
    /// this configuration.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, ConfigError> {
        if !self.contains(name) {
            return Err(ConfigError::unknown(name));
        }
        Ok(self.values.get(name))
    }

    /// Iterates over the assigned values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|value| (*name, value)))
    }

    /// Checks that every required parameter has a value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredParameter`] for the first
    /// required parameter without a value.
    pub fn check_required(&self) -> Result<(), ConfigError> {
        match self
            .order
            .iter()
            .find(|name| self.required.contains(*name) && !self.values.contains_key(*name))
        {
            Some(name) => Err(ConfigError::missing(name)),
            None => Ok(()),
        }
    }

    /// Returns a numeric parameter, or `None` if it has no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not numeric.
    pub fn float(&self, name: &str) -> Result<Option<f64>, ConfigError> {
        self.typed(name, Value::as_f64)
    }

    /// Returns a non-negative integer parameter, or `None` if it has no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not a count.
    pub fn count(&self, name: &str) -> Result<Option<usize>, ConfigError> {
        self.typed(name, Value::as_usize)
    }

    /// Returns a text parameter, or `None` if it has no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not text.
    pub fn text(&self, name: &str) -> Result<Option<&str>, ConfigError> {
        self.typed(name, Value::as_str)
    }

    /// Returns a list-of-floats parameter, or `None` if it has no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not a list.
    pub fn floats(&self, name: &str) -> Result<Option<&[f64]>, ConfigError> {
        self.typed(name, Value::as_floats)
    }

    /// Returns a map parameter, or `None` if it has no value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not a map.
    pub fn map(&self, name: &str) -> Result<Option<&BTreeMap<String, f64>>, ConfigError> {
        self.typed(name, Value::as_map)
    }

    /// Like [`Configuration::float`], but a missing value is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredParameter`] if the value is unset.
    pub fn require_float(&self, name: &str) -> Result<f64, ConfigError> {
        self.float(name)?.ok_or_else(|| ConfigError::missing(name))
    }

    /// Like [`Configuration::count`], but a missing value is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredParameter`] if the value is unset.
    pub fn require_count(&self, name: &str) -> Result<usize, ConfigError> {
        self.count(name)?.ok_or_else(|| ConfigError::missing(name))
    }

    /// Like [`Configuration::text`], but a missing value is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredParameter`] if the value is unset.
    pub fn require_text(&self, name: &str) -> Result<&str, ConfigError> {
        self.text(name)?.ok_or_else(|| ConfigError::missing(name))
    }

    fn checked(&self, name: &str, value: Value) -> Result<(&'static str, Value), ConfigError> {
        let spec = self.spec(name).ok_or_else(|| ConfigError::unknown(name))?;
        spec.check(&value)?;
        Ok((spec.name(), value))
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get(name)? else {
            return Ok(None);
        };
        match extract(value) {
            Some(typed) => Ok(Some(typed)),
            None => Err(ConfigError::InvalidParameterValue {
                name: name.to_owned(),
                value: value.to_string(),
                expected: self
                    .spec(name)
                    .map_or_else(String::new, ParameterSpec::expected),
            }),
        }
    }
}
