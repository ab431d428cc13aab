//! Reusable termination predicates for Skein solvers.
//!
//! Every type here implements [`Terminate`], so it can be passed to
//! `Solver::solve` directly or combined with other predicates and closures.
//!
//! # Modules
//!
//! - [`predicates`]: stop on a threshold, on settling, or after a step or
//!   time limit
//! - [`combinators`]: [`TerminateExt`] for combining predicates with `or`
//!   and `and`, and for logging when a predicate stops a run
//!
//! # Example
//!
//! ```rust
//! use skein_core::Rhs;
//! use skein_observers::{TerminateExt, predicates::{StepLimit, Threshold}};
//! use skein_solvers::{Solver, Status};
//!
//! let mut solver = Solver::by_name("RK4", Rhs::scalar(|u, _t| -u))?;
//! solver.set_initial_condition(1.0)?;
//!
//! let time_points: Vec<f64> = (0..=100).map(|i| f64::from(i) * 0.1).collect();
//! let stop = Threshold::new(0.1).or(StepLimit::new(50)).logged("decay");
//!
//! let solution = solver.solve(&time_points, stop)?;
//! assert_eq!(solution.status, Status::Terminated);
//! assert!(solution.trajectory.last()[0] < 0.1);
//! # Ok::<(), skein_solvers::Error>(())
//! ```
//!
//! [`Terminate`]: skein_core::Terminate

pub mod combinators;
pub mod predicates;

pub use combinators::TerminateExt;
