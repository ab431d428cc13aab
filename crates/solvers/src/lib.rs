//! The solver engine and integration methods for Skein.
//!
//! A [`Solver`] binds a right-hand side to a [`Method`], owns the method's
//! [`Configuration`](skein_core::Configuration), and runs the
//! initialize/validate/step lifecycle over a list of requested time points.
//!
//! - [`Solver`]: the lifecycle engine, with `set`/`get`, `solve`, and
//!   `switch_to`
//! - [`Method`]: what a concrete integration method provides: parameter
//!   layers, validators, and a fresh step advancer per solve
//! - [`methods`]: the built-in catalog, looked up by name with [`method`]
//!   and listed with [`list_methods`]
//! - [`AdaptiveStepController`]: accept/reject step size control over any
//!   [`ErrorEstimator`](skein_core::ErrorEstimator)
//! - [`registry()`]: the process-wide table of every built-in parameter

mod adaptive;
mod catalog;
mod error;
mod method;
mod pipeline;
mod registry;
mod solver;

pub mod methods;

pub use adaptive::{AdaptiveSettings, AdaptiveStepController};
pub use catalog::{list_methods, method};
pub use error::Error;
pub use method::{Method, Parameters};
pub use pipeline::{
    CONSTANT_TIME_STEP, FINITE, NON_EMPTY, Pipeline, STRICTLY_MONOTONIC, Validator,
};
pub use registry::registry;
pub use solver::{NO_CONFIG, Phase, Solution, Solver, Status};
