use std::fmt;

use skein_core::{Configuration, ValidationError};

/// Relative tolerance used when comparing step sizes for equality.
const CONSTANT_STEP_RTOL: f64 = 1e-8;

/// A named check run before any step is taken.
#[derive(Clone, Copy)]
pub struct Validator {
    pub name: &'static str,
    pub check: fn(&Configuration, &[f64]) -> Result<(), ValidationError>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.name).finish()
    }
}

/// The ordered validation stages of a solver.
///
/// Base checks on the time points always come first, followed by the checks
/// contributed by the method, in the order it lists them.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Validator>,
}

impl Pipeline {
    #[must_use]
    pub fn new(method_stages: impl IntoIterator<Item = Validator>) -> Self {
        let stages = [NON_EMPTY, FINITE, STRICTLY_MONOTONIC]
            .into_iter()
            .chain(method_stages)
            .collect();
        Self { stages }
    }

    /// Runs every stage, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first failing stage.
    pub fn run(&self, config: &Configuration, time_points: &[f64]) -> Result<(), ValidationError> {
        self.stages
            .iter()
            .try_for_each(|stage| (stage.check)(config, time_points))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name)
    }
}

pub const NON_EMPTY: Validator = Validator {
    name: "non_empty",
    check: |_, time_points| {
        if time_points.is_empty() {
            Err(ValidationError::EmptyTimePoints)
        } else {
            Ok(())
        }
    },
};

pub const FINITE: Validator = Validator {
    name: "finite",
    check: |_, time_points| match time_points.iter().position(|t| !t.is_finite()) {
        Some(index) => Err(ValidationError::NonFiniteTimePoint {
            index,
            value: time_points[index],
        }),
        None => Ok(()),
    },
};

pub const STRICTLY_MONOTONIC: Validator = Validator {
    name: "strictly_monotonic",
    check: |_, time_points| {
        let Some(direction) = time_points.windows(2).next().map(|w| (w[1] - w[0]).signum()) else {
            return Ok(());
        };
        match time_points
            .windows(2)
            .position(|w| w[1] == w[0] || (w[1] - w[0]).signum() != direction)
        {
            Some(i) => Err(ValidationError::NonMonotonicTimePoints { index: i + 1 }),
            None => Ok(()),
        }
    },
};

/// Requires equally spaced time points, for fixed-step multistep formulas.
pub const CONSTANT_TIME_STEP: Validator = Validator {
    name: "constant_time_step",
    check: |_, time_points| {
        let mut steps = time_points.windows(2).map(|w| w[1] - w[0]);
        let Some(expected) = steps.next() else {
            return Ok(());
        };
        let tolerance = CONSTANT_STEP_RTOL * expected.abs();
        match steps.position(|dt| (dt - expected).abs() > tolerance) {
            Some(i) => Err(ValidationError::NonConstantTimeStep {
                index: i + 1,
                dt: time_points[i + 2] - time_points[i + 1],
                expected,
            }),
            None => Ok(()),
        }
    },
};
