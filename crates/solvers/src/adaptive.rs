//! Adaptive step size control.
//!
//! # Algorithm
//!
//! The [`AdaptiveStepController`] covers each requested interval
//! `[t[n], t[n + 1]]` with substeps of its own choosing:
//!
//! 1. Propose a substep of the current size `h`, shortened to land exactly
//!    on `t[n + 1]` (the final two substeps share what is left when it is
//!    less than `2h`).
//! 2. Ask the [`ErrorEstimator`] for the trial solution and its local error,
//!    and measure the error as a root-mean-square norm scaled by
//!    `atol + rtol * |u|`. A norm of at most 1 is within tolerance.
//! 3. Accept: advance and grow `h` by `safety * err^(-1 / (order + 1))`,
//!    limited to `max_growth` and to `[min_step, max_step]`.
//! 4. Reject: shrink `h` by the same formula, but by no more than
//!    `min_shrink`, and retry from the same state. More than `max_retries`
//!    rejections of one substep, or a rejection at `min_step`, fails the step.
//!
//! The step size carries over between intervals, so closely spaced output
//! times do not reset the controller.


use std::ops::Bound;

use log::{debug, trace, warn};
use ndarray::{Array1, ArrayView1};
use skein_core::{
    ConfigError, Configuration, ErrorEstimator, Kind, ParameterSpec, RegistryBuilder, Step,
    StepAdvancer, StepError,
};

use crate::Parameters;

const NUMBER: &[Kind] = &[Kind::Int, Kind::Float];

/// Ratio between the derived `atol` and `rtol`.
const ATOL_PER_RTOL: f64 = 1e-2;

/// Fraction of the full time span used as the derived `min_step`.
const MIN_STEP_PER_SPAN: f64 = 1e-12;

/// Tolerances shared by every variable-step method, including black boxes.
pub(crate) const TOLERANCES: Parameters =
    Parameters::optional(&["rtol", "atol", "first_step", "min_step", "max_step"]);

/// Step size control settings of the built-in controller.
pub(crate) const CONTROL: Parameters =
    Parameters::optional(&["safety", "max_retries", "max_growth", "min_shrink"]);

/// Registers the adaptive family's parameters.
pub(crate) fn register(builder: &mut RegistryBuilder) -> Result<(), ConfigError> {
    builder.register_all([
        ParameterSpec::new("rtol", "Relative tolerance of the local error", NUMBER)
            .with_default(1e-6)
            .positive(),
        ParameterSpec::new(
            "atol",
            "Absolute tolerance of the local error (default: rtol * 1e-2)",
            NUMBER,
        )
        .positive(),
        ParameterSpec::new(
            "first_step",
            "Size of the first trial step (default: first output interval)",
            NUMBER,
        )
        .positive(),
        ParameterSpec::new(
            "min_step",
            "Smallest step size allowed (default: 1e-12 of the time span)",
            NUMBER,
        )
        .positive(),
        ParameterSpec::new(
            "max_step",
            "Largest step size allowed (default: the time span)",
            NUMBER,
        )
        .positive(),
        ParameterSpec::new(
            "safety",
            "Factor applied to the optimal step size change",
            &[Kind::Float],
        )
        .with_default(0.9)
        .with_range(Bound::Excluded(0.0), Bound::Included(1.0)),
        ParameterSpec::new(
            "max_retries",
            "Rejections allowed for one substep before the step fails",
            &[Kind::Int],
        )
        .with_default(30)
        .at_least(0.0),
        ParameterSpec::new("max_growth", "Largest factor a step size may grow by", NUMBER)
            .with_default(5.0)
            .at_least(1.0),
        ParameterSpec::new(
            "min_shrink",
            "Smallest factor a rejected step size may shrink by",
            &[Kind::Float],
        )
        .with_default(0.2)
        .with_range(Bound::Excluded(0.0), Bound::Included(1.0)),
    ])?;
    Ok(())
}

/// Derives `atol` from `rtol` unless it was set explicitly.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `rtol` is missing or the derived value is
/// invalid.
pub(crate) fn derive_atol(config: &mut Configuration) -> Result<(), ConfigError> {
    if !config.is_explicit("atol") {
        let rtol = config.require_float("rtol")?;
        config.set_derived("atol", rtol * ATOL_PER_RTOL)?;
    }
    Ok(())
}

/// Typed settings for adaptive step control, resolved when a solve begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSettings {
    pub rtol: f64,
    pub atol: f64,
    pub first_step: f64,
    pub min_step: f64,
    pub max_step: f64,
    pub safety: f64,
    pub max_retries: usize,
    pub max_growth: f64,
    pub min_shrink: f64,
}

/// Step bounds resolved against the requested time points.
struct StepBounds {
    first: f64,
    min: f64,
    max: f64,
}

impl AdaptiveSettings {
    /// Reads the settings, deriving unset step bounds from `time_points`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value is missing or has the wrong kind,
    /// or if `min_step` exceeds `max_step`.
    pub fn resolve(config: &Configuration, time_points: &[f64]) -> Result<Self, ConfigError> {
        let positive = |h: f64| h.is_finite() && h > 0.0;

        let span = match (time_points.first(), time_points.last()) {
            (Some(first), Some(last)) => (last - first).abs(),
            _ => 0.0,
        };
        let span = if positive(span) { span } else { 1.0 };
        let first_interval = match time_points {
            [t0, t1, ..] if positive((t1 - t0).abs()) => (t1 - t0).abs(),
            _ => span,
        };

        let bounds = Self::step_bounds(config, span, first_interval)?;
        Ok(Self {
            rtol: config.require_float("rtol")?,
            atol: config.require_float("atol")?,
            first_step: bounds.first,
            min_step: bounds.min,
            max_step: bounds.max,
            safety: config.require_float("safety")?,
            max_retries: config.require_count("max_retries")?,
            max_growth: config.require_float("max_growth")?,
            min_shrink: config.require_float("min_shrink")?,
        })
    }

    /// Reads the step bounds, falling back to the span and first interval.
    fn step_bounds(
        config: &Configuration,
        span: f64,
        first_interval: f64,
    ) -> Result<StepBounds, ConfigError> {
        let max_step = config.float("max_step")?.unwrap_or(span);
        let min_step = config
            .float("min_step")?
            .unwrap_or_else(|| (span * MIN_STEP_PER_SPAN).min(max_step));

        if min_step > max_step {
            return Err(ConfigError::InvalidParameterValue {
                name: "min_step".to_owned(),
                value: min_step.to_string(),
                expected: format!("at most max_step ({max_step})"),
            });
        }

        Ok(StepBounds {
            first: config
                .float("first_step")?
                .unwrap_or(first_interval)
                .clamp(min_step, max_step),
            min: min_step,
            max: max_step,
        })
    }
}

/// Root-mean-square of the error scaled by `atol + rtol * max(|u|, |u_new|)`.
pub(crate) fn error_norm(
    error: &Array1<f64>,
    u: ArrayView1<'_, f64>,
    u_new: &Array1<f64>,
    atol: f64,
    rtol: f64,
) -> f64 {
    if error.is_empty() {
        return 0.0;
    }
    let sum: f64 = error
        .iter()
        .zip(u.iter().zip(u_new))
        .map(|(e, (a, b))| {
            let scale = atol + rtol * a.abs().max(b.abs());
            (e / scale).powi(2)
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let len = error.len() as f64;
    (sum / len).sqrt()
}

/// Drives an [`ErrorEstimator`] with accept/reject step size control.
#[derive(Debug)]
pub struct AdaptiveStepController<E> {
    estimator: E,
    settings: AdaptiveSettings,
    h: f64,
}

impl<E: ErrorEstimator> AdaptiveStepController<E> {
    #[must_use]
    pub fn new(estimator: E, settings: AdaptiveSettings) -> Self {
        Self {
            estimator,
            h: settings.first_step,
            settings,
        }
    }

    /// The step size the next substep will try.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.h
    }

    #[must_use]
    pub fn settings(&self) -> &AdaptiveSettings {
        &self.settings
    }

    /// Scales a step size by `safety * err^(-1 / (order + 1))`.
    fn factor(&self, err: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let exponent = 1.0 / (self.estimator.order() as f64 + 1.0);
        if err == 0.0 {
            self.settings.max_growth
        } else {
            self.settings.safety * err.powf(-exponent)
        }
    }
}

impl<E: ErrorEstimator> StepAdvancer for AdaptiveStepController<E> {
    fn advance(&mut self, step: &Step<'_>) -> Result<Array1<f64>, StepError> {
        let AdaptiveSettings {
            rtol,
            atol,
            min_step,
            max_step,
            max_retries,
            max_growth,
            min_shrink,
            ..
        } = self.settings;

        let target = step.t_next();
        let direction = (target - step.t()).signum();
        let mut u = step.u().to_owned();
        let mut t = step.t();

        loop {
            let remaining = (target - t).abs();
            let mut retries = 0;

            let landed = loop {
                let (dt, lands) = if self.h >= remaining {
                    (remaining, true)
                } else if self.h > 0.5 * remaining {
                    (0.5 * remaining, false)
                } else {
                    (self.h, false)
                };
                let t_trial = if lands { target } else { t + direction * dt };

                let (accepted, factor) =
                    match self.estimator.attempt(step, u.view(), t, t_trial - t) {
                        Ok(attempt) => {
                            let err = error_norm(&attempt.error, u.view(), &attempt.u, atol, rtol);
                            trace!("substep at t = {t} (dt = {dt:e}): error {err:.3e}");
                            if err <= 1.0 {
                                (Some(attempt.u), self.factor(err).min(max_growth))
                            } else {
                                (None, self.factor(err).max(min_shrink))
                            }
                        }
                        Err(err) if err.is_recoverable() => {
                            trace!("substep at t = {t} (dt = {dt:e}): {err}");
                            (None, min_shrink.max(0.5))
                        }
                        Err(err) => return Err(err),
                    };

                if let Some(u_next) = accepted {
                    u = u_next;
                    t = t_trial;
                    let grown = (dt * factor).clamp(min_step, max_step);
                    self.h = if lands && dt < self.h { grown.max(self.h) } else { grown };
                    break lands;
                }

                retries += 1;
                debug!("rejected substep at t = {t} (dt = {dt:e}), retry {retries}");
                if dt <= min_step {
                    warn!("step size reached the minimum {min_step:e} at t = {t}");
                    return Err(StepError::StepFailure { t, dt, retries });
                }
                if retries > max_retries {
                    return Err(StepError::StepFailure { t, dt, retries });
                }
                self.h = (dt * factor.min(1.0)).max(min_step);
            };

            if landed {
                return Ok(u);
            }
        }
    }
}
