//! Predicates that decide from the trajectory alone.
//!
//! All of them only read levels up to the one just accepted.

use skein_core::{Terminate, Trajectory};

/// Largest absolute component of `u` at one level.
fn max_abs(trajectory: &Trajectory, level: usize) -> f64 {
    trajectory
        .row(level)
        .iter()
        .fold(0.0, |m: f64, x| m.max(x.abs()))
}

/// Stops once every component of the latest level is below a tolerance in
/// absolute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    tolerance: f64,
}

impl Threshold {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Terminate for Threshold {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        max_abs(trajectory, step_no) < self.tolerance
    }
}

/// Stops once the solution changes by less than a tolerance in one step.
///
/// The change is the largest absolute difference between the latest two
/// levels, divided by the step size when `per_unit_time` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settled {
    tolerance: f64,
    per_unit_time: bool,
}

impl Settled {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            per_unit_time: false,
        }
    }

    /// Compares the rate of change instead of the change per step.
    #[must_use]
    pub fn per_unit_time(self) -> Self {
        Self {
            per_unit_time: true,
            ..self
        }
    }
}

impl Terminate for Settled {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        if step_no == 0 {
            return false;
        }
        let (now, before) = (trajectory.row(step_no), trajectory.row(step_no - 1));
        let change = now
            .iter()
            .zip(before.iter())
            .fold(0.0, |m: f64, (a, b)| m.max((a - b).abs()));

        let change = if self.per_unit_time {
            let t = trajectory.t();
            change / (t[step_no] - t[step_no - 1]).abs()
        } else {
            change
        };
        change < self.tolerance
    }
}

/// Stops after a fixed number of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLimit {
    steps: usize,
}

impl StepLimit {
    #[must_use]
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }
}

impl Terminate for StepLimit {
    fn terminate(&mut self, _trajectory: &Trajectory, step_no: usize) -> bool {
        step_no >= self.steps
    }
}

/// Stops once the solution reaches a time, in the direction of integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeLimit {
    t_end: f64,
}

impl TimeLimit {
    #[must_use]
    pub fn new(t_end: f64) -> Self {
        Self { t_end }
    }
}

impl Terminate for TimeLimit {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        let t = trajectory.t();
        let (t0, t_now) = (t[0], t[step_no]);
        if t_now >= t0 {
            t_now >= self.t_end
        } else {
            t_now <= self.t_end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    fn trajectory(levels: &[(f64, [f64; 2])]) -> Trajectory {
        let (t0, u0) = levels[0];
        let mut trajectory = Trajectory::new(&u0.into(), t0);
        for (t, u) in &levels[1..] {
            trajectory.push(array![u[0], u[1]].view(), *t).unwrap();
        }
        trajectory
    }

    #[test]
    fn threshold_uses_every_component() {
        let trajectory = trajectory(&[
            (0.0, [1.0, 1.0]),
            (1.0, [0.01, -0.5]),
            (2.0, [0.01, 0.05]),
        ]);
        let mut stop = Threshold::new(0.1);

        assert!(!stop.terminate(&trajectory, 0));
        assert!(!stop.terminate(&trajectory, 1));
        assert!(stop.terminate(&trajectory, 2));
    }

    #[test]
    fn settled_compares_consecutive_levels() {
        let trajectory = trajectory(&[
            (0.0, [1.0, 0.0]),
            (0.5, [1.2, 0.0]),
            (1.0, [1.25, 0.0]),
        ]);

        let mut per_step = Settled::new(0.1);
        assert!(!per_step.terminate(&trajectory, 0));
        assert!(!per_step.terminate(&trajectory, 1));
        assert!(per_step.terminate(&trajectory, 2));

        // A change of 0.05 over 0.5 is a rate of 0.1.
        let mut rate = Settled::new(0.08).per_unit_time();
        assert!(!rate.terminate(&trajectory, 2));
    }

    #[test]
    fn limits() {
        let forward = trajectory(&[(0.0, [0.0, 0.0]), (1.0, [0.0, 0.0]), (2.0, [0.0, 0.0])]);
        assert!(!StepLimit::new(2).terminate(&forward, 1));
        assert!(StepLimit::new(2).terminate(&forward, 2));
        assert!(!TimeLimit::new(1.5).terminate(&forward, 1));
        assert!(TimeLimit::new(1.5).terminate(&forward, 2));

        let backward = trajectory(&[(2.0, [0.0, 0.0]), (1.0, [0.0, 0.0]), (0.0, [0.0, 0.0])]);
        assert!(!TimeLimit::new(0.5).terminate(&backward, 1));
        assert!(TimeLimit::new(0.5).terminate(&backward, 2));
    }
}
