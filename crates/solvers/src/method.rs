use skein_core::{ConfigError, Configuration, StepAdvancer};

use crate::{Error, Solver, Validator};

/// A layer of parameter names contributed by a method or method family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parameters {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl Parameters {
    #[must_use]
    pub const fn optional(names: &'static [&'static str]) -> Self {
        Self {
            required: &[],
            optional: names,
        }
    }
}

/// An integration method that a [`Solver`] can run.
///
/// A method declares its parameters as ordered layers (family first, most
/// specific last), may derive configuration values in [`Method::adjust`],
/// contributes validators that run before any step is taken, and builds a
/// fresh [`StepAdvancer`] for every solve.
///
/// The parameters shared by all solvers (`f_args`, `f_kwargs`) are added by
/// the solver itself and need not be listed.
pub trait Method {
    /// The canonical name, as accepted by [`method`](crate::method).
    fn name(&self) -> &'static str;

    /// A one-line description for listings.
    fn description(&self) -> &'static str;

    fn parameters(&self) -> Vec<Parameters> {
        Vec::new()
    }

    /// Parameters whose values distinguish runs of this method in
    /// [`Solver::describe`].
    fn identity(&self) -> &'static [&'static str] {
        &[]
    }

    /// Post-processes the configuration after construction and after every
    /// change, for example to derive one default from another value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a derived value is invalid.
    fn adjust(&self, _config: &mut Configuration) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Checks run on the requested time points after the base checks.
    fn validators(&self) -> Vec<Validator> {
        Vec::new()
    }

    /// Builds the step advancer for one solve over `time_points`.
    ///
    /// Typed settings are resolved from the solver's configuration here.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the configuration cannot be resolved or an
    /// auxiliary solver cannot be created.
    fn build(&self, solver: &Solver, time_points: &[f64]) -> Result<Box<dyn StepAdvancer>, Error>;
}
