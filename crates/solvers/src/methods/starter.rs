use log::debug;
use skein_core::{InitialCondition, Step, StepError, Trajectory};

use crate::{Error, NO_CONFIG, Solver};

/// An auxiliary one-step solver that supplies the first levels of a
/// multistep method.
///
/// The child is an independent solver created from the parent's
/// configuration, so it sees the same right-hand side and extra arguments
/// but keeps its own state.
#[derive(Debug)]
pub(crate) struct Starter {
    method: String,
    child: Solver,
}

impl Starter {
    /// Creates a child solver for `method` from the parent's configuration.
    pub fn new(parent: &Solver, method: &str) -> Result<Self, Error> {
        let child = parent.switch_to(method, NO_CONFIG)?;
        Ok(Self {
            method: method.to_owned(),
            child,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Integrates from the current level over the first `levels` intervals.
    ///
    /// The child runs over the parent's remaining time points, so its
    /// right-hand side sees the same [`StepContext`](skein_core::StepContext),
    /// and stops after `levels` steps. The returned trajectory starts with the
    /// step's own level and holds at most `levels` further ones, fewer if the
    /// time points end sooner.
    pub fn bootstrap(&mut self, step: &Step<'_>, levels: usize) -> Result<Trajectory, StepError> {
        let history = step.history();
        let initial = if history.is_scalar() {
            InitialCondition::Scalar(step.u()[0])
        } else {
            InitialCondition::Vector(step.u().to_owned())
        };

        let remaining = &step.time_points()[step.n()..];
        debug!(
            "starting with {} over {} levels",
            self.child.describe(),
            levels.min(remaining.len() - 1)
        );

        let run = |child: &mut Solver| -> Result<Trajectory, Error> {
            child.set_initial_condition(initial)?;
            let stop = |_: &Trajectory, step_no: usize| step_no >= levels;
            Ok(child.solve(remaining, stop)?.trajectory)
        };
        run(&mut self.child).map_err(|err| StepError::starter(&self.method, err))
    }
}
