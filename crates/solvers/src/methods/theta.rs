//! Implicit one-step methods of the theta family.
//!
//! ```text
//! u[n+1] = u[n] + dt * (theta * f(u[n+1], t[n+1]) + (1 - theta) * f(u[n], t[n]))
//! ```
//!
//! `theta = 0` is forward Euler, `theta = 0.5` the trapezoidal rule (Crank-
//! Nicolson), and `theta = 1` backward Euler. The implicit equation is solved
//! by fixed-point iteration starting from a forward Euler guess.

use ndarray::Array1;
use skein_core::{
    ConfigError, Configuration, Kind, ParameterSpec, RegistryBuilder, Step, StepAdvancer,
    StepError,
};

use crate::{Error, Method, Parameters, Solver};

const NUMBER: &[Kind] = &[Kind::Int, Kind::Float];

const ITERATION: Parameters = Parameters::optional(&["max_iter", "eps_iter"]);

/// Registers the theta family's parameters.
pub(crate) fn register(builder: &mut RegistryBuilder) -> Result<(), ConfigError> {
    builder.register_all([
        ParameterSpec::new(
            "theta",
            "Weight of the implicit term (0: forward Euler, 0.5: Crank-Nicolson, 1: backward Euler)",
            NUMBER,
        )
        .with_default(0.5)
        .within(0.0, 1.0),
        ParameterSpec::new(
            "max_iter",
            "Maximum number of iterations for the implicit equation",
            &[Kind::Int],
        )
        .with_default(25)
        .at_least(1.0),
        ParameterSpec::new(
            "eps_iter",
            "Relative change below which the implicit iteration has converged",
            NUMBER,
        )
        .with_default(1e-4)
        .positive(),
    ])?;
    Ok(())
}

/// Typed settings for the theta family, resolved when a solve begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaSettings {
    pub theta: f64,
    pub max_iter: usize,
    pub eps_iter: f64,
}

impl ThetaSettings {
    /// Reads `theta`, `max_iter` and `eps_iter` from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value is missing or has the wrong kind.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        Self::with_theta(config.require_float("theta")?, config)
    }

    /// Reads the iteration bounds and uses the given `theta`.
    fn with_theta(theta: f64, config: &Configuration) -> Result<Self, ConfigError> {
        Ok(Self {
            theta,
            max_iter: config.require_count("max_iter")?,
            eps_iter: config.require_float("eps_iter")?,
        })
    }
}

/// The fixed-point iteration for one theta step.
struct ThetaStep(ThetaSettings);

impl StepAdvancer for ThetaStep {
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        let ThetaSettings {
            theta,
            max_iter,
            eps_iter,
        } = self.0;
        let (u, t, t_next, dt) = (step.u(), step.t(), step.t_next(), step.dt());

        let f_n = step.f(u, t)?;

        let mut explicit_part = u.to_owned();
        explicit_part.scaled_add((1.0 - theta) * dt, &f_n);

        let mut guess = u.to_owned();
        guess.scaled_add(dt, &f_n);

        let mut change = f64::INFINITY;
        for _ in 0..max_iter {
            let mut next = explicit_part.clone();
            next.scaled_add(theta * dt, &step.f(guess.view(), t_next)?);

            change = next
                .iter()
                .zip(&guess)
                .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()));
            let scale = next.iter().fold(1.0_f64, |m, x| m.max(x.abs()));
            guess = next;

            if change <= eps_iter * scale {
                return Ok(guess);
            }
        }

        Err(StepError::Convergence {
            iterations: max_iter,
            change,
        })
    }
}

/// The theta rule with a configurable `theta`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThetaRule;

impl Method for ThetaRule {
    fn name(&self) -> &'static str {
        "ThetaRule"
    }

    fn description(&self) -> &'static str {
        "Unified Forward/Backward Euler and Crank-Nicolson scheme"
    }

    fn parameters(&self) -> Vec<Parameters> {
        vec![ITERATION, Parameters::optional(&["theta"])]
    }

    fn identity(&self) -> &'static [&'static str] {
        &["theta"]
    }

    fn build(&self, solver: &Solver, _time_points: &[f64]) -> Result<Box<dyn StepAdvancer>, Error> {
        let settings = ThetaSettings::from_config(solver.config())?;
        Ok(Box::new(ThetaStep(settings)))
    }
}

/// Backward Euler: the theta rule with `theta` fixed to 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardEuler;

impl Method for BackwardEuler {
    fn name(&self) -> &'static str {
        "BackwardEuler"
    }

    fn description(&self) -> &'static str {
        "Implicit 1st-order Backward Euler method"
    }

    fn parameters(&self) -> Vec<Parameters> {
        vec![ITERATION]
    }

    fn build(&self, solver: &Solver, _time_points: &[f64]) -> Result<Box<dyn StepAdvancer>, Error> {
        let settings = ThetaSettings::with_theta(1.0, solver.config())?;
        Ok(Box::new(ThetaStep(settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use skein_core::{Rhs, Value};

    use crate::{Status, methods::ForwardEuler};

    fn decay_solver<M: Method + 'static>(method: M) -> Solver {
        let mut solver = Solver::new(method, Rhs::scalar(|u, _t| -u)).unwrap();
        solver.set_initial_condition(1.0).unwrap();
        solver
    }

    #[test]
    fn theta_zero_matches_forward_euler() {
        let time_points = [0.0, 0.1, 0.2, 0.3];

        let mut theta = decay_solver(ThetaRule);
        theta.set("theta", 0).unwrap();
        let implicit = theta.solve_to_end(&time_points).unwrap();

        let explicit = decay_solver(ForwardEuler).solve_to_end(&time_points).unwrap();

        assert_eq!(implicit.trajectory.u(), explicit.trajectory.u());
    }

    #[test]
    fn backward_euler_is_stable_for_stiff_decay() {
        // u' = -50u with dt = 0.1 blows up explicitly but decays implicitly.
        // Fixed-point iteration cannot converge here, so use a mild problem
        // and check against the closed form of the implicit recurrence.
        let mut solver = Solver::new(BackwardEuler, Rhs::scalar(|u, _t| -2.0 * u)).unwrap();
        solver.set_initial_condition(1.0).unwrap();
        solver.set("eps_iter", 1e-12).unwrap();
        solver.set("max_iter", 200).unwrap();

        let solution = solver.solve_to_end(&[0.0, 0.1, 0.2]).unwrap();
        let u = solution.trajectory.scalar_values().unwrap();

        // u[n+1] = u[n] / (1 + 2 dt)
        assert_relative_eq!(u[1], 1.0 / 1.2, epsilon = 1e-10);
        assert_relative_eq!(u[2], 1.0 / 1.44, epsilon = 1e-10);
    }

    #[test]
    fn crank_nicolson_is_second_order() {
        let error = |steps: u32| {
            let mut solver = decay_solver(ThetaRule);
            solver.set("eps_iter", 1e-14).unwrap();
            let time_points: Vec<f64> =
                (0..=steps).map(|i| f64::from(i) / f64::from(steps)).collect();
            let solution = solver.solve_to_end(&time_points).unwrap();
            (solution.trajectory.last()[0] - (-1.0_f64).exp()).abs()
        };

        assert_relative_eq!((error(10) / error(20)).log2(), 2.0, epsilon = 0.1);
    }

    #[test]
    fn non_convergence_is_reported() {
        // The fixed-point map for u' = -30u with dt = 1 is not a contraction.
        let mut solver = Solver::new(BackwardEuler, Rhs::scalar(|u, _t| -30.0 * u)).unwrap();
        solver.set_initial_condition(1.0).unwrap();

        let err = solver.solve_to_end(&[0.0, 1.0, 2.0]).unwrap_err();

        assert!(matches!(
            err.step_error(),
            Some(StepError::Convergence { iterations: 25, .. })
        ));
        assert_eq!(err.partial().map(|p| p.len()), Some(1));
    }

    #[test]
    fn backward_euler_has_no_theta() {
        let solver = decay_solver(BackwardEuler);
        assert!(solver.get("theta").is_err());
        assert_eq!(solver.describe(), "BackwardEuler");
    }

    #[test]
    fn describe_shows_non_default_theta() {
        let mut solver = decay_solver(ThetaRule);
        assert_eq!(solver.describe(), "ThetaRule");

        solver.set("theta", 0.5).unwrap();
        assert_eq!(solver.describe(), "ThetaRule");

        solver.set("theta", 0).unwrap();
        assert_eq!(solver.describe(), "ThetaRule(theta=0)");
        assert_eq!(solver.to_string(), "ThetaRule(theta=0)");

        let solution = solver.solve_to_end(&[0.0, 0.5]).unwrap();
        assert_eq!(solution.status, Status::Complete);
    }

    #[test]
    fn settings_read_from_config() {
        let mut solver = decay_solver(ThetaRule);
        solver.set_many([("theta", 1.0), ("eps_iter", 1e-6)]).unwrap();

        let settings = ThetaSettings::from_config(solver.config()).unwrap();
        assert_eq!(
            settings,
            ThetaSettings {
                theta: 1.0,
                max_iter: 25,
                eps_iter: 1e-6,
            }
        );
    }

    #[test]
    fn unset_values_are_the_registered_defaults() {
        let solver = decay_solver(ThetaRule);
        let settings = ThetaSettings::from_config(solver.config()).unwrap();

        let default = |name| crate::registry().get(name).and_then(|spec| spec.default());
        assert_eq!(default("theta").and_then(Value::as_f64), Some(settings.theta));
        assert_eq!(default("max_iter").and_then(Value::as_usize), Some(settings.max_iter));
        assert_eq!(default("eps_iter").and_then(Value::as_f64), Some(settings.eps_iter));
    }
}
