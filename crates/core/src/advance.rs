use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1};

use crate::{Rhs, StepContext, StepError, Trajectory};

/// A read-only view of the solver positioned at time level `n`.
///
/// The trajectory holds exactly the levels `0..=n` accepted so far. A step
/// advancer reads from it and from the requested time points, and evaluates
/// the right-hand side through [`Step::f`] so the step context is supplied.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    trajectory: &'a Trajectory,
    time_points: &'a [f64],
    rhs: &'a Rhs,
    args: &'a [f64],
    kwargs: &'a BTreeMap<String, f64>,
}

impl<'a> Step<'a> {
    /// Positions a step at the last level of `trajectory`.
    ///
    /// `time_points` must extend at least one level past the trajectory.
    #[must_use]
    pub fn new(
        trajectory: &'a Trajectory,
        time_points: &'a [f64],
        rhs: &'a Rhs,
        args: &'a [f64],
        kwargs: &'a BTreeMap<String, f64>,
    ) -> Self {
        Self {
            trajectory,
            time_points,
            rhs,
            args,
            kwargs,
        }
    }

    /// Index of the current time level.
    #[must_use]
    pub fn n(&self) -> usize {
        self.trajectory.n()
    }

    /// The solution at the current time level.
    #[must_use]
    pub fn u(&self) -> ArrayView1<'a, f64> {
        self.trajectory.last()
    }

    /// The current time.
    #[must_use]
    pub fn t(&self) -> f64 {
        self.trajectory.last_time()
    }

    /// The time the step must reach.
    #[must_use]
    pub fn t_next(&self) -> f64 {
        self.time_points.get(self.n() + 1).copied().unwrap_or(self.t())
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.t_next() - self.t()
    }

    /// All accepted time levels.
    #[must_use]
    pub fn history(&self) -> &'a Trajectory {
        self.trajectory
    }

    #[must_use]
    pub fn time_points(&self) -> &'a [f64] {
        self.time_points
    }

    #[must_use]
    pub fn rhs(&self) -> &'a Rhs {
        self.rhs
    }

    #[must_use]
    pub fn context(&self) -> StepContext<'a> {
        StepContext {
            n: self.n(),
            dt: self.dt(),
            time_points: self.time_points,
            args: self.args,
            kwargs: self.kwargs,
        }
    }

    /// Evaluates the right-hand side with this step's context.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`Rhs::eval`].
    pub fn f(&self, u: ArrayView1<'_, f64>, t: f64) -> Result<Array1<f64>, StepError> {
        self.rhs.eval(u, t, &self.context())
    }
}

/// The per-method operation that produces the next accepted solution value.
///
/// An advancer is built fresh for every solve and may keep method-specific
/// history between calls (for example previous derivative evaluations). It
/// must not assume anything about levels it has not been shown.
///
/// Closures taking a [`Step`] implement this trait.
pub trait StepAdvancer {
    /// Computes `u[n + 1]` from the solver state at level `n`.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the step cannot be completed.
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError>;
}

impl<F> StepAdvancer for F
where
    F: FnMut(&Step<'_>) -> Result<Array1<f64>, StepError>,
{
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        self(step)
    }
}

/// A trial step and its local error estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// The solution at the end of the trial step.
    pub u: Array1<f64>,

    /// Component-wise estimate of the local error.
    pub error: Array1<f64>,
}

/// A one-step formula that reports a local error estimate.
///
/// Adaptive step control drives an estimator over substeps of its own
/// choosing, starting from arbitrary `(u, t)` within the current interval.
pub trait ErrorEstimator {
    /// Order of the error estimate, used to scale step size changes.
    fn order(&self) -> usize;

    /// Takes a trial step of size `dt` from `(u, t)`.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the right-hand side fails or, for
    /// implicit formulas, if the iteration does not converge.
    fn attempt(
        &mut self,
        step: &Step<'_>,
        u: ArrayView1<'_, f64>,
        t: f64,
        dt: f64,
    ) -> Result<Attempt, StepError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn step_reads_current_level() {
        let mut trajectory = Trajectory::new(&1.0.into(), 0.0);
        trajectory.push(array![2.0].view(), 0.5).unwrap();

        let time_points = [0.0, 0.5, 1.5];
        let rhs = Rhs::new(|u, t| u[0] + t);
        let kwargs = BTreeMap::new();
        let step = Step::new(&trajectory, &time_points, &rhs, &[], &kwargs);

        assert_eq!(step.n(), 1);
        assert_eq!(step.u(), array![2.0]);
        assert_relative_eq!(step.t(), 0.5);
        assert_relative_eq!(step.t_next(), 1.5);
        assert_relative_eq!(step.dt(), 1.0);
        assert_eq!(step.context().n, 1);

        let f = step.f(step.u(), step.t()).unwrap();
        assert_relative_eq!(f[0], 2.5);
        assert_eq!(rhs.evaluations(), 1);
    }

    #[test]
    fn closures_are_advancers() {
        let trajectory = Trajectory::new(&3.0.into(), 0.0);
        let time_points = [0.0, 1.0];
        let rhs = Rhs::new(|_u, _t| 1.0);
        let kwargs = BTreeMap::new();
        let step = Step::new(&trajectory, &time_points, &rhs, &[], &kwargs);

        fn explicit_euler(step: &Step<'_>) -> Result<Array1<f64>, StepError> {
            let mut next = step.u().to_owned();
            next.scaled_add(step.dt(), &step.f(step.u(), step.t())?);
            Ok(next)
        }

        let mut advancer = explicit_euler;
        assert_eq!(advancer.advance(&step).unwrap(), array![4.0]);
    }
}
