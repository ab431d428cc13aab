use std::error::Error as StdError;

use thiserror::Error;

/// Errors raised while registering parameters or configuring a solver.
///
/// These are always reported before any stepping begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown parameter `{name}`")]
    UnknownParameter { name: String },

    #[error("invalid value `{value}` for parameter `{name}`: expected {expected}")]
    InvalidParameterValue {
        name: String,
        value: String,
        expected: String,
    },

    #[error("missing required parameter `{name}`")]
    MissingRequiredParameter { name: String },

    #[error("parameter `{name}` is already registered with a different spec")]
    DuplicateParameter { name: String },
}

impl ConfigError {
    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownParameter {
            name: name.to_owned(),
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        Self::MissingRequiredParameter {
            name: name.to_owned(),
        }
    }
}

/// Errors raised when the requested time points or initial condition are
/// inconsistent with the problem or the method.
///
/// A validation error aborts a solve before any step is taken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("time points must not be empty")]
    EmptyTimePoints,

    #[error("time point {index} is not finite ({value})")]
    NonFiniteTimePoint { index: usize, value: f64 },

    #[error("time points must be strictly monotonic (violated at index {index})")]
    NonMonotonicTimePoints { index: usize },

    #[error("time step {index} is {dt}, but a constant step of {expected} is required")]
    NonConstantTimeStep {
        index: usize,
        dt: f64,
        expected: f64,
    },

    #[error("initial condition must not be empty")]
    EmptyInitialCondition,

    #[error("initial condition component {index} is not finite")]
    NonFiniteInitialCondition { index: usize },
}

/// Errors raised while advancing the solution by one step.
///
/// Steps accepted before the failure are kept by the solver and returned
/// alongside the error.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("iteration did not converge after {iterations} iterations (last change {change:e})")]
    Convergence { iterations: usize, change: f64 },

    #[error("step size control failed at t = {t} after {retries} retries (dt = {dt:e})")]
    StepFailure { t: f64, dt: f64, retries: usize },

    #[error("right-hand side error: {0}")]
    Rhs(#[source] Box<dyn StdError + Send + Sync>),

    #[error("right-hand side returned {found} values, expected {expected}")]
    RhsShape { expected: usize, found: usize },

    #[error("starter method `{method}` failed: {source}")]
    Starter {
        method: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("integrator error: {0}")]
    Integrator(#[source] Box<dyn StdError + Send + Sync>),
}

impl StepError {
    pub fn rhs<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Rhs(Box::new(err))
    }

    pub fn integrator<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Integrator(Box::new(err))
    }

    pub fn starter<E: StdError + Send + Sync + 'static>(method: &str, err: E) -> Self {
        Self::Starter {
            method: method.to_owned(),
            source: Box::new(err),
        }
    }

    /// Returns `true` if a caller may retry the step with a smaller size.
    ///
    /// Only a failed implicit iteration is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Convergence { .. })
    }
}
