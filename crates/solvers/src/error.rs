use skein_core::{ConfigError, StepError, Trajectory, ValidationError};
use thiserror::Error;

/// Errors returned by a [`Solver`](crate::Solver).
///
/// Configuration and validation errors are reported before the trajectory
/// is touched. A step error carries the levels accepted before the failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid problem data: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown method `{name}`")]
    UnknownMethod { name: String },

    #[error("an initial condition must be set before solving")]
    MissingInitialCondition,

    #[error("step from level {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: StepError,
        partial: Trajectory,
    },
}

impl Error {
    /// The levels accepted before a step failed, if this is a step error.
    #[must_use]
    pub fn partial(&self) -> Option<&Trajectory> {
        match self {
            Self::Step { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// The underlying step error, if this is a step error.
    #[must_use]
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}
