//! Embedded Runge-Kutta pairs with adaptive step size control.
//!
//! Both formulas of a pair share their stages. The solution advances with
//! `b` and the difference to the companion formula, `dt * sum(e[i] * k[i])`,
//! estimates the local error.

use ndarray::{Array1, ArrayView1};
use skein_core::{
    Attempt, ConfigError, Configuration, ErrorEstimator, Step, StepAdvancer, StepError,
};

use crate::{
    Error, Method, Parameters, Solver,
    adaptive::{self, AdaptiveSettings, AdaptiveStepController},
};

use super::tableau::{Tableau, combine};

/// A tableau with the error weights of its embedded companion formula.
#[derive(Debug)]
pub(crate) struct EmbeddedPair {
    pub tableau: &'static Tableau,
    pub error_weights: &'static [f64],
    pub order: usize,
}

impl ErrorEstimator for &'static EmbeddedPair {
    fn order(&self) -> usize {
        self.order
    }

    fn attempt(
        &mut self,
        step: &Step<'_>,
        u: ArrayView1<'_, f64>,
        t: f64,
        dt: f64,
    ) -> Result<Attempt, StepError> {
        let k = self.tableau.stages(step, u, t, dt)?;
        let zero = Array1::zeros(u.len());
        Ok(Attempt {
            u: combine(u, dt, self.tableau.b, &k),
            error: combine(zero.view(), dt, self.error_weights, &k),
        })
    }
}

/// Heun's method with an embedded forward Euler step.
const HEUN_EULER: EmbeddedPair = EmbeddedPair {
    tableau: &Tableau {
        c: &[0.0, 1.0],
        a: &[&[], &[1.0]],
        b: &[0.5, 0.5],
    },
    error_weights: &[-0.5, 0.5],
    order: 1,
};

/// The Runge-Kutta-Fehlberg 4(5) pair, advancing with the fourth-order
/// formula.
const FEHLBERG: EmbeddedPair = EmbeddedPair {
    tableau: &Tableau {
        c: &[0.0, 1.0 / 4.0, 3.0 / 8.0, 12.0 / 13.0, 1.0, 1.0 / 2.0],
        a: &[
            &[],
            &[1.0 / 4.0],
            &[3.0 / 32.0, 9.0 / 32.0],
            &[1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0],
            &[439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0],
            &[
                -8.0 / 27.0,
                2.0,
                -3544.0 / 2565.0,
                1859.0 / 4104.0,
                -11.0 / 40.0,
            ],
        ],
        b: &[
            25.0 / 216.0,
            0.0,
            1408.0 / 2565.0,
            2197.0 / 4104.0,
            -1.0 / 5.0,
            0.0,
        ],
    },
    error_weights: &[
        1.0 / 360.0,
        0.0,
        -128.0 / 4275.0,
        -2197.0 / 75240.0,
        1.0 / 50.0,
        2.0 / 55.0,
    ],
    order: 4,
};

static PAIRS: [EmbeddedPair; 2] = [HEUN_EULER, FEHLBERG];

fn build_controller(
    pair: &'static EmbeddedPair,
    config: &Configuration,
    time_points: &[f64],
) -> Result<Box<dyn StepAdvancer>, Error> {
    let settings = AdaptiveSettings::resolve(config, time_points)?;
    Ok(Box::new(AdaptiveStepController::new(pair, settings)))
}

macro_rules! embedded_method {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $description:literal, $pair:expr) => {
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
                vec![adaptive::TOLERANCES, adaptive::CONTROL]
            }

            fn identity(&self) -> &'static [&'static str] {
                &["rtol", "atol"]
            }

            fn adjust(&self, config: &mut Configuration) -> Result<(), ConfigError> {
                adaptive::derive_atol(config)
            }

            fn build(
                &self,
                solver: &Solver,
                time_points: &[f64],
            ) -> Result<Box<dyn StepAdvancer>, Error> {
                build_controller($pair, solver.config(), time_points)
            }
        }
    };
}

embedded_method!(
    /// Heun's method with forward Euler error estimation, order 2(1).
    HeunEuler,
    "HeunEuler",
    "Adaptive Heun-Euler method with 2nd-order steps and 1st-order error estimate",
    &PAIRS[0]
);

embedded_method!(
    /// The Runge-Kutta-Fehlberg method, order 4(5).
    RKFehlberg,
    "RKFehlberg",
    "Adaptive Runge-Kutta-Fehlberg method of order 4(5)",
    &PAIRS[1]
);
