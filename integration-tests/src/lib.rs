//! Problems with known solutions shared by the integration tests.

use skein_core::Rhs;
use skein_solvers::{Error, Solver};

/// `u' = -u`, solved by `u(t) = u0 * exp(-(t - t0))`.
#[must_use]
pub fn decay() -> Rhs {
    Rhs::scalar(|u, _t| -u)
}

/// `x'' = -x` as the system `[x, v]' = [v, -x]`.
#[must_use]
pub fn oscillator() -> Rhs {
    Rhs::new(|u, _t| [u[1], -u[0]])
}

/// `steps + 1` equally spaced time points from `t0` to `t1`.
#[must_use]
pub fn uniform(t0: f64, t1: f64, steps: u32) -> Vec<f64> {
    (0..=steps)
        .map(|i| t0 + (t1 - t0) * f64::from(i) / f64::from(steps))
        .collect()
}

/// A solver for `u' = -u` with `u(0) = 1`.
///
/// # Errors
///
/// Returns an error if `name` is not a built-in method.
pub fn decay_solver(name: &str) -> Result<Solver, Error> {
    let mut solver = Solver::by_name(name, decay())?;
    solver.set_initial_condition(1.0)?;
    Ok(solver)
}

/// Absolute error at `t = 1` of `u' = -u` solved on `steps` equal steps.
///
/// # Errors
///
/// Returns an error if the solver cannot be created or the solve fails.
pub fn decay_error(name: &str, steps: u32) -> Result<f64, Error> {
    let solution = decay_solver(name)?.solve_to_end(&uniform(0.0, 1.0, steps))?;
    Ok((solution.trajectory.last()[0] - (-1.0_f64).exp()).abs())
}
