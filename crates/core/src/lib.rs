//! Core types and contracts for the Skein ODE integration engine.
//!
//! This crate defines the shared abstractions that the solver engine, its
//! methods, and termination predicates build on:
//!
//! - [`ParameterSpec`], [`ParameterRegistry`], [`Configuration`]: parameter
//!   declarations, the registry that validates them, and the per-solver values
//! - [`Rhs`], [`RightHandSide`], [`StepContext`]: the right-hand side `f(u, t)`
//!   adapted to a fixed-shape array result
//! - [`Trajectory`], [`InitialCondition`]: the accepted solution history
//! - [`StepAdvancer`], [`ErrorEstimator`], [`Step`]: what a concrete
//!   integration method implements
//! - [`Terminate`]: a predicate consulted after every accepted step
//! - [`BlackBoxIntegrator`], [`RhsCompiler`]: collaborators implemented
//!   outside this crate
//!
//! # Features
//!
//! - `serde-derive`: derives `Serialize`/`Deserialize` for [`Value`] and [`Kind`].

mod advance;
mod compile;
mod config;
mod error;
mod integrator;
mod param;
mod registry;
mod rhs;
mod terminate;
mod trajectory;
mod value;

pub use advance::{Attempt, ErrorEstimator, Step, StepAdvancer};
pub use compile::{RhsCompiler, Signature};
pub use config::Configuration;
pub use error::{ConfigError, StepError, ValidationError};
pub use integrator::{BlackBoxIntegrator, Callback, Samples};
pub use param::{Constraint, ParameterSpec};
pub use registry::{ParameterRegistry, RegistryBuilder};
pub use rhs::{IntoDerivative, Rhs, RightHandSide, StepContext};
pub use terminate::Terminate;
pub use trajectory::{InitialCondition, Trajectory};
pub use value::{Kind, Value};
