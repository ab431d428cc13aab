//! Explicit Adams-Bashforth multistep methods.
//!
//! An order-`k` method combines the derivatives at the `k` most recent levels:
//!
//! ```text
//! u[n+1] = u[n] + dt * (c[0] * f[n] + c[1] * f[n-1] + ... + c[k-1] * f[n-k+1])
//! ```
//!
//! The first `k - 1` levels are produced by a one-step starter method, named
//! by `start_method`. All methods here require a constant time step.

use std::collections::VecDeque;

use ndarray::Array1;
use skein_core::{
    ConfigError, Configuration, Kind, ParameterSpec, RegistryBuilder, Step, StepAdvancer,
    StepError, Trajectory,
};

use crate::{Error, Method, Parameters, Solver, Validator, pipeline};

use super::{explicit, starter::Starter};

/// Registers the multistep family's parameters.
pub(crate) fn register(builder: &mut RegistryBuilder) -> Result<(), ConfigError> {
    builder.register(
        ParameterSpec::new(
            "start_method",
            "One-step method that computes the first levels",
            &[Kind::Text],
        )
        .with_default("RK4")
        .one_of(explicit::NAMES),
    )?;
    Ok(())
}

/// Typed settings for the multistep family, resolved when a solve begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultistepSettings {
    pub start_method: String,
}

impl MultistepSettings {
    /// Reads `start_method` from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the value is missing or has the wrong kind.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        Ok(Self {
            start_method: config.require_text("start_method")?.to_owned(),
        })
    }
}

const AB2: &[f64] = &[3.0 / 2.0, -1.0 / 2.0];
const AB3: &[f64] = &[23.0 / 12.0, -16.0 / 12.0, 5.0 / 12.0];
const AB4: &[f64] = &[55.0 / 24.0, -59.0 / 24.0, 37.0 / 24.0, -9.0 / 24.0];

#[derive(Debug, thiserror::Error)]
#[error("starter did not produce level {level}")]
struct MissingLevel {
    level: usize,
}

/// Steps with fixed Adams-Bashforth coefficients.
struct AdamsBashforth {
    coefficients: &'static [f64],
    start_method: String,

    /// The child solver and its levels, dropped once the formula takes over.
    starter: Option<Starter>,
    started: Option<Trajectory>,

    /// Derivatives at the most recent levels, newest first.
    derivatives: VecDeque<Array1<f64>>,
}

impl AdamsBashforth {
    fn new(coefficients: &'static [f64], starter: Starter) -> Self {
        Self {
            coefficients,
            start_method: starter.method().to_owned(),
            starter: Some(starter),
            started: None,
            derivatives: VecDeque::with_capacity(coefficients.len()),
        }
    }

    fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the starter's solution at `level`, running it on the first
    /// step of a solve.
    fn start(&mut self, step: &Step<'_>, level: usize) -> Result<Array1<f64>, StepError> {
        let missing = || StepError::starter(&self.start_method, MissingLevel { level });

        if self.started.is_none() {
            let levels = self.order() - 1;
            let starter = self.starter.as_mut().ok_or_else(missing)?;
            self.started = Some(starter.bootstrap(step, levels)?);
        }
        self.started
            .as_ref()
            .filter(|started| level < started.len())
            .map(|started| started.row(level).to_owned())
            .ok_or_else(missing)
    }
}

impl StepAdvancer for AdamsBashforth {
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        let n = step.n();

        self.derivatives.push_front(step.f(step.u(), step.t())?);
        self.derivatives.truncate(self.order());

        if n + 1 < self.order() {
            return self.start(step, n + 1);
        }
        if self.starter.take().is_some() {
            self.started = None;
        }

        let mut next = step.u().to_owned();
        for (c, f) in self.coefficients.iter().zip(&self.derivatives) {
            next.scaled_add(step.dt() * c, f);
        }
        Ok(next)
    }
}

fn build_advancer(
    coefficients: &'static [f64],
    solver: &Solver,
) -> Result<Box<dyn StepAdvancer>, Error> {
    let settings = MultistepSettings::from_config(solver.config())?;
    let starter = Starter::new(solver, &settings.start_method)?;
    Ok(Box::new(AdamsBashforth::new(coefficients, starter)))
}

macro_rules! adams_method {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $description:literal, $coefficients:expr) => {
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

            fn parameters(&self) -> Vec<Parameters> {
                vec![Parameters::optional(&["start_method"])]
            }

            fn identity(&self) -> &'static [&'static str] {
                &["start_method"]
            }

            fn validators(&self) -> Vec<Validator> {
                vec![pipeline::CONSTANT_TIME_STEP]
            }

            fn build(
                &self,
                solver: &Solver,
                _time_points: &[f64],
            ) -> Result<Box<dyn StepAdvancer>, Error> {
                build_advancer($coefficients, solver)
            }
        }
    };
}

adams_method!(
    /// The two-step Adams-Bashforth method, second order.
    AdamsBashforth2,
    "AdamsBashforth2",
    "Explicit 2nd-order Adams-Bashforth method",
    AB2
);

adams_method!(
    /// The three-step Adams-Bashforth method, third order.
    AdamsBashforth3,
    "AdamsBashforth3",
    "Explicit 3rd-order Adams-Bashforth method",
    AB3
);

adams_method!(
    /// The four-step Adams-Bashforth method, fourth order.
    AdamsBashforth4,
    "AdamsBashforth4",
    "Explicit 4th-order Adams-Bashforth method",
    AB4
);
