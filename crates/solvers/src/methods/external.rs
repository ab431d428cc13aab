//! Black-box integrators as methods.
//!
//! An [`External`] method hands the whole remaining time span to a
//! [`BlackBoxIntegrator`] in one call on the first step, then replays the
//! returned samples one level at a time. The integrator reads its tolerances
//! from the solver's configuration.

use ndarray::{Array1, Array2, ArrayView1};
use skein_core::{
    BlackBoxIntegrator, ConfigError, Configuration, Samples, Step, StepAdvancer, StepError,
};
use thiserror::Error;

use crate::{Error, Method, Parameters, Solver, adaptive};

/// Samples that do not line up with the requested time points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("integrator returned {found} samples, expected {expected}")]
    Count { expected: usize, found: usize },

    #[error("sample {index} is at t = {found}, expected {expected}")]
    Misaligned {
        index: usize,
        expected: f64,
        found: f64,
    },
}

/// Relative tolerance used when matching sample times to time points.
const SAMPLE_TIME_RTOL: f64 = 1e-10;

/// A method backed by a [`BlackBoxIntegrator`].
///
/// Each solve works on a fresh clone of the integrator.
#[derive(Debug, Clone)]
pub struct External<I> {
    name: &'static str,
    integrator: I,
}

impl<I> External<I> {
    #[must_use]
    pub fn new(name: &'static str, integrator: I) -> Self {
        Self { name, integrator }
    }

    #[must_use]
    pub fn integrator(&self) -> &I {
        &self.integrator
    }
}

impl<I> Method for External<I>
where
    I: BlackBoxIntegrator + Clone + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Externally implemented black-box integrator"
    }

    fn parameters(&self) -> Vec<Parameters> {
        vec![adaptive::TOLERANCES]
    }

    fn identity(&self) -> &'static [&'static str] {
        &["rtol", "atol"]
    }

    fn adjust(&self, config: &mut Configuration) -> Result<(), ConfigError> {
        adaptive::derive_atol(config)
    }

    fn build(&self, solver: &Solver, _time_points: &[f64]) -> Result<Box<dyn StepAdvancer>, Error> {
        Ok(Box::new(Replay {
            integrator: self.integrator.clone(),
            options: solver.config().clone(),
            samples: None,
        }))
    }
}

/// Forces the higher-ranked signature expected by [`skein_core::Callback`].
fn callback<F>(f: F) -> F
where
    F: FnMut(ArrayView1<'_, f64>, f64) -> Result<Array1<f64>, StepError>,
{
    f
}

struct Replay<I> {
    integrator: I,
    options: Configuration,

    /// Samples from the first level of the solve onwards.
    samples: Option<Array2<f64>>,
}

impl<I: BlackBoxIntegrator> Replay<I> {
    fn integrate(&mut self, step: &Step<'_>) -> Result<Array2<f64>, StepError> {
        let t_span = &step.time_points()[step.n()..];

        let mut failure = None;
        let mut rhs = callback(|u, t| {
            step.f(u, t).map_err(|err| {
                let message = err.to_string();
                failure = Some(err);
                StepError::Rhs(message.into())
            })
        });
        let result = self
            .integrator
            .integrate(&mut rhs, step.u(), t_span, &self.options);

        if let Some(err) = failure {
            return Err(err);
        }
        let Samples { u, t } = result.map_err(StepError::integrator)?;

        if u.nrows() != t_span.len() || t.len() != t_span.len() {
            return Err(StepError::integrator(SampleError::Count {
                expected: t_span.len(),
                found: u.nrows().min(t.len()),
            }));
        }
        for (index, (&found, &expected)) in t.iter().zip(t_span).enumerate() {
            if (found - expected).abs() > SAMPLE_TIME_RTOL * expected.abs().max(1.0) {
                return Err(StepError::integrator(SampleError::Misaligned {
                    index,
                    expected,
                    found,
                }));
            }
        }
        Ok(u)
    }
}

impl<I: BlackBoxIntegrator> StepAdvancer for Replay<I> {
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        let samples = match self.samples.take() {
            Some(samples) => samples,
            None => self.integrate(step)?,
        };
        // Every sample row lines up with a time point, starting at level 0.
        let row = samples.row(step.n() + 1).to_owned();
        self.samples = Some(samples);
        Ok(row)
    }
}
