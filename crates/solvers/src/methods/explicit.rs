//! Explicit one-step Runge-Kutta methods.
//!
//! Each step is a pure function of `u[n]`, `t[n]` and `t[n + 1]`.

use ndarray::Array1;
use skein_core::{Step, StepAdvancer, StepError};

use crate::{Error, Method, Solver};

use super::tableau::Tableau;

/// Names of the explicit one-step methods, usable as multistep starters.
pub(crate) const NAMES: &[&str] = &["ForwardEuler", "Heun", "RK2", "RK4"];

const FORWARD_EULER: Tableau = Tableau {
    c: &[0.0],
    a: &[&[]],
    b: &[1.0],
};

const HEUN: Tableau = Tableau {
    c: &[0.0, 1.0],
    a: &[&[], &[1.0]],
    b: &[0.5, 0.5],
};

const MIDPOINT: Tableau = Tableau {
    c: &[0.0, 0.5],
    a: &[&[], &[0.5]],
    b: &[0.0, 1.0],
};

const CLASSIC_RK4: Tableau = Tableau {
    c: &[0.0, 0.5, 0.5, 1.0],
    a: &[&[], &[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
};

/// Steps with a fixed explicit tableau.
struct Explicit(&'static Tableau);

impl StepAdvancer for Explicit {
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        self.0.step(step, step.u(), step.t(), step.dt())
    }
}

macro_rules! explicit_method {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $description:literal, $tableau:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl Method for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn build(
                &self,
                _solver: &Solver,
                _time_points: &[f64],
            ) -> Result<Box<dyn StepAdvancer>, Error> {
                Ok(Box::new(Explicit(&$tableau)))
            }
        }
    };
}

explicit_method!(
    /// The forward Euler method, first order.
    ForwardEuler,
    "ForwardEuler",
    "The simple explicit (forward) Euler scheme",
    FORWARD_EULER
);

explicit_method!(
    /// Heun's method (explicit trapezoidal rule), second order.
    Heun,
    "Heun",
    "Heun's explicit method (2nd-order Runge-Kutta)",
    HEUN
);

explicit_method!(
    /// The explicit midpoint method, second order.
    RK2,
    "RK2",
    "Explicit 2nd-order Runge-Kutta (midpoint) method",
    MIDPOINT
);

explicit_method!(
    /// The classical fourth-order Runge-Kutta method.
    RK4,
    "RK4",
    "Explicit 4th-order Runge-Kutta method",
    CLASSIC_RK4
);

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use skein_core::Rhs;

    /// Solves u' = -u, u(0) = 1 on `steps` equal steps over [0, 1].
    fn final_error<M: Method + 'static>(method: M, steps: u32) -> f64 {
        let mut solver = Solver::new(method, Rhs::scalar(|u, _t| -u)).unwrap();
        solver.set_initial_condition(1.0).unwrap();

        let time_points: Vec<f64> = (0..=steps).map(|i| f64::from(i) / f64::from(steps)).collect();
        let solution = solver.solve_to_end(&time_points).unwrap();
        let u = solution.trajectory.scalar_values().unwrap();

        (u[u.len() - 1] - (-1.0_f64).exp()).abs()
    }

    fn observed_order<M: Method + Copy + 'static>(method: M) -> f64 {
        (final_error(method, 20) / final_error(method, 40)).log2()
    }

    #[test]
    fn forward_euler_single_step() {
        let mut solver = Solver::new(ForwardEuler, Rhs::new(|u, _t| 2.0 * u[0])).unwrap();
        solver.set_initial_condition(1.0).unwrap();

        let solution = solver.solve_to_end(&[0.0, 0.5]).unwrap();
        assert_eq!(solution.trajectory.scalar_values(), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn observed_orders() {
        assert_relative_eq!(observed_order(ForwardEuler), 1.0, epsilon = 0.1);
        assert_relative_eq!(observed_order(Heun), 2.0, epsilon = 0.1);
        assert_relative_eq!(observed_order(RK2), 2.0, epsilon = 0.1);
        assert_relative_eq!(observed_order(RK4), 4.0, epsilon = 0.1);
    }

    #[test]
    fn rk4_on_a_system() {
        // Harmonic oscillator: u = [x, v], x'' = -x.
        let mut solver = Solver::new(RK4, Rhs::new(|u, _t| [u[1], -u[0]])).unwrap();
        solver.set_initial_condition([1.0, 0.0]).unwrap();

        let time_points: Vec<f64> = (0..=100).map(|i| f64::from(i) * 0.01).collect();
        let solution = solver.solve_to_end(&time_points).unwrap();

        let last = solution.trajectory.last();
        assert_relative_eq!(last[0], 1.0_f64.cos(), epsilon = 1e-9);
        assert_relative_eq!(last[1], -(1.0_f64.sin()), epsilon = 1e-9);
    }

    #[test]
    fn names_match_catalog() {
        assert_eq!(
            [ForwardEuler.name(), Heun.name(), RK2.name(), RK4.name()],
            NAMES
        );
    }
}
