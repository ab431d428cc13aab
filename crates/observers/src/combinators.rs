//! Combining and instrumenting termination predicates.
//!
//! Combined predicates always consult both sides, so stateful predicates see
//! every step regardless of what the other side decides.

use log::info;
use skein_core::{Terminate, Trajectory};

/// Stops when either predicate stops.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B> {
    first: A,
    second: B,
}

impl<A: Terminate, B: Terminate> Terminate for Or<A, B> {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        let first = self.first.terminate(trajectory, step_no);
        let second = self.second.terminate(trajectory, step_no);
        first || second
    }
}

/// Stops when both predicates stop on the same step.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B> {
    first: A,
    second: B,
}

impl<A: Terminate, B: Terminate> Terminate for And<A, B> {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        let first = self.first.terminate(trajectory, step_no);
        let second = self.second.terminate(trajectory, step_no);
        first && second
    }
}

/// Logs at `info` level when the wrapped predicate stops a run.
#[derive(Debug, Clone)]
pub struct Logged<T> {
    inner: T,
    label: String,
}

impl<T: Terminate> Terminate for Logged<T> {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        let stop = self.inner.terminate(trajectory, step_no);
        if stop {
            info!(
                "{} stopped the solve at level {step_no} (t = {})",
                self.label,
                trajectory.t()[step_no]
            );
        }
        stop
    }
}

/// Combinators available on every [`Terminate`] implementation.
pub trait TerminateExt: Terminate + Sized {
    /// Stops when either `self` or `other` stops.
    fn or<B: Terminate>(self, other: B) -> Or<Self, B> {
        Or {
            first: self,
            second: other,
        }
    }

    /// Stops when `self` and `other` stop on the same step.
    fn and<B: Terminate>(self, other: B) -> And<Self, B> {
        And {
            first: self,
            second: other,
        }
    }

    /// Logs under `label` when this predicate stops a run.
    fn logged(self, label: impl Into<String>) -> Logged<Self> {
        Logged {
            inner: self,
            label: label.into(),
        }
    }
}

impl<T: Terminate> TerminateExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    use crate::predicates::{StepLimit, Threshold};

    fn trajectory() -> Trajectory {
        let mut trajectory = Trajectory::new(&1.0.into(), 0.0);
        for (i, u) in [0.5, 0.2, 0.05].into_iter().enumerate() {
            trajectory.push(array![u].view(), (i + 1) as f64).unwrap();
        }
        trajectory
    }

    #[test]
    fn or_and_and() {
        let trajectory = trajectory();

        let mut either = Threshold::new(0.1).or(StepLimit::new(2));
        assert!(!either.terminate(&trajectory, 1));
        assert!(either.terminate(&trajectory, 2));

        let mut both = Threshold::new(0.1).and(StepLimit::new(2));
        assert!(!both.terminate(&trajectory, 2));
        assert!(both.terminate(&trajectory, 3));
    }

    #[test]
    fn both_sides_see_every_step() {
        let trajectory = trajectory();
        let mut seen = Vec::new();

        {
            let record = |_: &Trajectory, step_no: usize| {
                seen.push(step_no);
                false
            };
            let mut stop = StepLimit::new(1).or(record);
            for step_no in 1..=3 {
                stop.terminate(&trajectory, step_no);
            }
        }

        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn logged_passes_the_decision_through() {
        let trajectory = trajectory();
        let mut stop = Threshold::new(0.1).logged("threshold");

        assert!(!stop.terminate(&trajectory, 2));
        assert!(stop.terminate(&trajectory, 3));
    }
}
