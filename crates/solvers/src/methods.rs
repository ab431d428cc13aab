//! The built-in integration methods.
//!
//! - [`explicit`]: one-step Runge-Kutta formulas (`ForwardEuler`, `Heun`,
//!   `RK2`, `RK4`)
//! - [`theta`]: the implicit theta rule and backward Euler
//! - [`adams`]: Adams-Bashforth multistep formulas with a one-step starter
//! - [`embedded`]: embedded Runge-Kutta pairs under adaptive step control
//! - [`external`]: black-box integrators wrapped as methods

pub mod adams;
pub mod embedded;
pub mod explicit;
pub mod external;
pub mod theta;

mod starter;
mod tableau;

pub use adams::{AdamsBashforth2, AdamsBashforth3, AdamsBashforth4, MultistepSettings};
pub use embedded::{HeunEuler, RKFehlberg};
pub use explicit::{ForwardEuler, Heun, RK2, RK4};
pub use external::{External, SampleError};
pub use theta::{BackwardEuler, ThetaRule, ThetaSettings};
