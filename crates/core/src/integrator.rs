use std::error::Error as StdError;

use ndarray::{Array1, Array2, ArrayView1};

use crate::{Configuration, StepError};

/// The right-hand side as seen by a black-box integrator.
pub type Callback<'a> =
    dyn FnMut(ArrayView1<'_, f64>, f64) -> Result<Array1<f64>, StepError> + 'a;

/// Samples returned by a black-box integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    /// Solution values, one row per sample.
    pub u: Array2<f64>,

    /// Sample times.
    pub t: Vec<f64>,
}

/// An externally implemented time integrator invoked as one opaque call.
///
/// Bindings to compiled stiff or adaptive codes implement this trait. The
/// integrator receives the right-hand side as a callback, the starting value,
/// the span of times to report, and the solver configuration to read
/// tolerances from. Failures are returned in the integrator's own error type
/// and reach the caller unchanged.
///
/// If `rhs` returns an error, the integrator should stop and report it; the
/// solver surfaces the right-hand side's error in preference to the
/// integrator's.
pub trait BlackBoxIntegrator {
    type Error: StdError + Send + Sync + 'static;

    /// Integrates from `u0` at `t_span[0]` and samples every time in `t_span`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] with the integrator's native status if the
    /// integration fails.
    fn integrate(
        &mut self,
        rhs: &mut Callback<'_>,
        u0: ArrayView1<'_, f64>,
        t_span: &[f64],
        options: &Configuration,
    ) -> Result<Samples, Self::Error>;
}
