use std::{fmt, ops::Bound};

use crate::{ConfigError, Kind, Value};

/// A restriction on the legal values of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// A numeric interval with independently open, closed, or unbounded ends.
    Range { lower: Bound<f64>, upper: Bound<f64> },

    /// An enumerated set of text values.
    OneOf(&'static [&'static str]),
}

impl Constraint {
    /// Returns `true` if `value` satisfies the constraint.
    ///
    /// Non-numeric values never satisfy a range, and non-text values never
    /// satisfy an enumeration.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Constraint::Range { lower, upper } => {
                let Some(x) = value.as_f64() else {
                    return false;
                };
                let above = match lower {
                    Bound::Included(min) => x >= *min,
                    Bound::Excluded(min) => x > *min,
                    Bound::Unbounded => !x.is_nan(),
                };
                let below = match upper {
                    Bound::Included(max) => x <= *max,
                    Bound::Excluded(max) => x < *max,
                    Bound::Unbounded => !x.is_nan(),
                };
                above && below
            }
            Constraint::OneOf(options) => value
                .as_str()
                .is_some_and(|s| options.iter().any(|option| *option == s)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range { lower, upper } => {
                match lower {
                    Bound::Included(min) => write!(f, "[{min}, ")?,
                    Bound::Excluded(min) => write!(f, "({min}, ")?,
                    Bound::Unbounded => f.write_str("(-inf, ")?,
                }
                match upper {
                    Bound::Included(max) => write!(f, "{max}]"),
                    Bound::Excluded(max) => write!(f, "{max})"),
                    Bound::Unbounded => f.write_str("inf)"),
                }
            }
            Constraint::OneOf(options) => write!(f, "one of {}", options.join(", ")),
        }
    }
}

/// The registered description of a solver parameter.
///
/// A spec names the parameter, documents it, lists the value kinds it
/// accepts, and optionally carries a default and a [`Constraint`].
///
/// Specs are built with a small builder chain:
///
/// ```
/// use skein_core::{Kind, ParameterSpec};
///
/// let theta = ParameterSpec::new("theta", "Weight of the implicit term", &[Kind::Int, Kind::Float])
///     .with_default(0.5)
///     .within(0.0, 1.0);
///
/// assert!(theta.check(&0.25.into()).is_ok());
/// assert!(theta.check(&2.0.into()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: &'static str,
    help: &'static str,
    kinds: &'static [Kind],
    default: Option<Value>,
    constraint: Option<Constraint>,
}

impl ParameterSpec {
    #[must_use]
    pub const fn new(name: &'static str, help: &'static str, kinds: &'static [Kind]) -> Self {
        Self {
            name,
            help,
            kinds,
            default: None,
            constraint: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_range(mut self, lower: Bound<f64>, upper: Bound<f64>) -> Self {
        self.constraint = Some(Constraint::Range { lower, upper });
        self
    }

    /// Restricts the value to the closed interval `[min, max]`.
    #[must_use]
    pub fn within(self, min: f64, max: f64) -> Self {
        self.with_range(Bound::Included(min), Bound::Included(max))
    }

    /// Restricts the value to `[min, inf)`.
    #[must_use]
    pub fn at_least(self, min: f64) -> Self {
        self.with_range(Bound::Included(min), Bound::Unbounded)
    }

    /// Restricts the value to `(0, inf)`.
    #[must_use]
    pub fn positive(self) -> Self {
        self.with_range(Bound::Excluded(0.0), Bound::Unbounded)
    }

    #[must_use]
    pub fn one_of(mut self, options: &'static [&'static str]) -> Self {
        self.constraint = Some(Constraint::OneOf(options));
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn help(&self) -> &'static str {
        self.help
    }

    #[must_use]
    pub fn kinds(&self) -> &'static [Kind] {
        self.kinds
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Checks a value against the accepted kinds and the constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameterValue`] naming the parameter,
    /// the offending value, and what was expected.
    pub fn check(&self, value: &Value) -> Result<(), ConfigError> {
        let kind_ok = self.kinds.contains(&value.kind());
        let constraint_ok = self.constraint.as_ref().is_none_or(|c| c.admits(value));

        if kind_ok && constraint_ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidParameterValue {
                name: self.name.to_owned(),
                value: value.to_string(),
                expected: self.expected(),
            })
        }
    }

    /// Describes the accepted kinds and constraint, e.g. `int or float in [0, 1]`.
    #[must_use]
    pub fn expected(&self) -> String {
        let kinds = self
            .kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        match &self.constraint {
            Some(c @ Constraint::Range { .. }) => format!("{kinds} in {c}"),
            Some(c @ Constraint::OneOf(_)) => format!("{kinds}, {c}"),
            None => kinds,
        }
    }
}
