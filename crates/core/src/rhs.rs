use std::{
    cell::Cell, collections::BTreeMap, convert::Infallible, error::Error as StdError, fmt, rc::Rc,
};

use ndarray::{Array1, ArrayView1};

use crate::{RhsCompiler, Signature, StepError};

/// Information about the step being taken, passed to the right-hand side.
///
/// Some problems need more than `(u, t)`, for example a forcing term sampled
/// once per output time. The context exposes the index of the current time
/// level, the nominal step size, the full list of requested time points, and
/// the extra `f_args`/`f_kwargs` values from the solver's configuration.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Index of the time level the step starts from.
    pub n: usize,

    /// Nominal step size `t[n + 1] - t[n]` (zero on the final level).
    pub dt: f64,

    /// The requested output times.
    pub time_points: &'a [f64],

    /// Extra positional values (`f_args`).
    pub args: &'a [f64],

    /// Extra named values (`f_kwargs`).
    pub kwargs: &'a BTreeMap<String, f64>,
}

impl<'a> StepContext<'a> {
    /// A context with no extra arguments, for evaluating `f` outside a solve.
    #[must_use]
    pub fn detached(time_points: &'a [f64]) -> Self {
        static EMPTY: BTreeMap<String, f64> = BTreeMap::new();
        Self {
            n: 0,
            dt: 0.0,
            time_points,
            args: &[],
            kwargs: &EMPTY,
        }
    }
}

/// Values a right-hand side may return.
///
/// Every form is normalized to a one-dimensional array, so scalar problems
/// can return a plain `f64`.
pub trait IntoDerivative {
    fn into_derivative(self) -> Array1<f64>;
}

impl IntoDerivative for f64 {
    fn into_derivative(self) -> Array1<f64> {
        Array1::from_elem(1, self)
    }
}

impl IntoDerivative for Vec<f64> {
    fn into_derivative(self) -> Array1<f64> {
        Array1::from(self)
    }
}

impl<const N: usize> IntoDerivative for [f64; N] {
    fn into_derivative(self) -> Array1<f64> {
        Array1::from(self.to_vec())
    }
}

impl IntoDerivative for Array1<f64> {
    fn into_derivative(self) -> Array1<f64> {
        self
    }
}

/// A right-hand side `f(u, t)` defined by a type with a typed error.
///
/// Implement this for models that can fail or carry their own state. Plain
/// closures can use [`Rhs::new`] or [`Rhs::with_context`] instead.
pub trait RightHandSide {
    type Output: IntoDerivative;
    type Error: StdError + Send + Sync + 'static;

    /// Evaluates the derivative of `u` at time `t`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn call(
        &self,
        u: ArrayView1<'_, f64>,
        t: f64,
        ctx: &StepContext<'_>,
    ) -> Result<Self::Output, Self::Error>;
}

type DynRhs =
    dyn Fn(ArrayView1<'_, f64>, f64, &StepContext<'_>) -> Result<Array1<f64>, StepError>;

/// The right-hand side bound to a solver.
///
/// `Rhs` erases the user's callable behind a uniform signature that returns a
/// fixed-shape array, and counts how often it is evaluated. Clones share both
/// the callable and the count.
#[derive(Clone)]
pub struct Rhs {
    inner: Rc<DynRhs>,
    evaluations: Rc<Cell<usize>>,
}

impl Rhs {
    /// Wraps a closure `f(u, t)`.
    ///
    /// ```
    /// use skein_core::Rhs;
    ///
    /// // u' = -2u
    /// let rhs = Rhs::new(|u, _t| -2.0 * u[0]);
    /// ```
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, f64) -> R + 'static,
        R: IntoDerivative,
    {
        Self::from_fn(move |u, t, _ctx| Ok(f(u, t).into_derivative()))
    }

    /// Wraps a scalar closure `f(u, t)` operating on plain numbers.
    pub fn scalar<F>(f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + 'static,
    {
        Self::from_fn(move |u, t, _ctx| {
            let x = u.first().copied().unwrap_or(f64::NAN);
            Ok(f(x, t).into_derivative())
        })
    }

    /// Wraps a closure `f(u, t, ctx)` that also reads the [`StepContext`].
    pub fn with_context<F, R>(f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, f64, &StepContext<'_>) -> R + 'static,
        R: IntoDerivative,
    {
        Self::from_fn(move |u, t, ctx| Ok(f(u, t, ctx).into_derivative()))
    }

    /// Wraps a [`RightHandSide`] implementation.
    pub fn from_model<M>(model: M) -> Self
    where
        M: RightHandSide + 'static,
    {
        Self::from_fn(move |u, t, ctx| {
            model
                .call(u, t, ctx)
                .map(IntoDerivative::into_derivative)
                .map_err(StepError::rhs)
        })
    }

    /// Compiles a right-hand side written in a foreign language.
    ///
    /// # Errors
    ///
    /// Returns the compiler's error unchanged.
    pub fn compile<C: RhsCompiler>(
        compiler: &C,
        source: &str,
        signature: &Signature,
    ) -> Result<Self, C::Error> {
        compiler.compile(source, signature).map(Self::from_model)
    }

    fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>, f64, &StepContext<'_>) -> Result<Array1<f64>, StepError>
            + 'static,
    {
        Self {
            inner: Rc::new(f),
            evaluations: Rc::new(Cell::new(0)),
        }
    }

    /// Evaluates `f(u, t)` and checks that the result matches `u` in length.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Rhs`] if the callable fails, or
    /// [`StepError::RhsShape`] if it returns the wrong number of values.
    pub fn eval(
        &self,
        u: ArrayView1<'_, f64>,
        t: f64,
        ctx: &StepContext<'_>,
    ) -> Result<Array1<f64>, StepError> {
        self.evaluations.set(self.evaluations.get() + 1);

        let derivative = (self.inner)(u, t, ctx)?;
        if derivative.len() != u.len() {
            return Err(StepError::RhsShape {
                expected: u.len(),
                found: derivative.len(),
            });
        }
        Ok(derivative)
    }

    /// Number of evaluations made through this handle or any of its clones.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}

impl fmt::Debug for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rhs")
            .field("evaluations", &self.evaluations.get())
            .finish_non_exhaustive()
    }
}

/// A right-hand side that is identically zero.
impl RightHandSide for () {
    type Output = Vec<f64>;
    type Error = Infallible;

    fn call(
        &self,
        u: ArrayView1<'_, f64>,
        _t: f64,
        _ctx: &StepContext<'_>,
    ) -> Result<Self::Output, Self::Error> {
        Ok(vec![0.0; u.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;
    use thiserror::Error;

    #[test]
    fn scalar_results_become_arrays() {
        let rhs = Rhs::new(|u, t| u[0] * t);
        let ctx = StepContext::detached(&[]);

        let out = rhs.eval(array![3.0].view(), 2.0, &ctx).unwrap();

        assert_eq!(out, array![6.0]);
        assert_eq!(rhs.evaluations(), 1);
    }

    #[test]
    fn vector_results_pass_through() {
        let rhs = Rhs::new(|u, _t| [u[1], -u[0]]);
        let ctx = StepContext::detached(&[]);

        let out = rhs.eval(array![1.0, 2.0].view(), 0.0, &ctx).unwrap();
        assert_eq!(out, array![2.0, -1.0]);
    }

    #[test]
    fn wrong_length_is_a_shape_error() {
        let rhs = Rhs::new(|_u, _t| vec![1.0, 2.0, 3.0]);
        let ctx = StepContext::detached(&[]);

        let err = rhs.eval(array![1.0, 2.0].view(), 0.0, &ctx).unwrap_err();
        assert!(matches!(err, StepError::RhsShape { expected: 2, found: 3 }));
    }

    #[test]
    fn context_exposes_step_and_arguments() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("c".to_owned(), 4.0);
        let ctx = StepContext {
            n: 2,
            dt: 0.5,
            time_points: &[0.0, 0.5, 1.0, 1.5],
            args: &[10.0],
            kwargs: &kwargs,
        };

        let rhs = Rhs::with_context(|u, _t, ctx| {
            u[0] * ctx.kwargs["c"] + ctx.args[0] + ctx.time_points[ctx.n]
        });

        let out = rhs.eval(array![1.0].view(), 1.0, &ctx).unwrap();
        assert_relative_eq!(out[0], 15.0);
    }

    #[derive(Debug, Error)]
    #[error("negative state")]
    struct NegativeState;

    struct SquareRoot;

    impl RightHandSide for SquareRoot {
        type Output = f64;
        type Error = NegativeState;

        fn call(
            &self,
            u: ArrayView1<'_, f64>,
            _t: f64,
            _ctx: &StepContext<'_>,
        ) -> Result<f64, NegativeState> {
            if u[0] < 0.0 { Err(NegativeState) } else { Ok(u[0].sqrt()) }
        }
    }

    #[test]
    fn model_errors_are_boxed() {
        let rhs = Rhs::from_model(SquareRoot);
        let ctx = StepContext::detached(&[]);

        assert_relative_eq!(rhs.eval(array![4.0].view(), 0.0, &ctx).unwrap()[0], 2.0);

        let err = rhs.eval(array![-1.0].view(), 0.0, &ctx).unwrap_err();
        assert!(matches!(err, StepError::Rhs(_)));
        assert_eq!(err.to_string(), "right-hand side error: negative state");
    }

    #[test]
    fn clones_share_the_count() {
        let rhs = Rhs::scalar(|u, _t| u);
        let ctx = StepContext::detached(&[]);
        rhs.eval(array![1.0].view(), 0.0, &ctx).unwrap();

        let copy = rhs.clone();
        assert_eq!(copy.evaluations(), 1);

        copy.eval(array![1.0].view(), 0.0, &ctx).unwrap();
        assert_eq!(rhs.evaluations(), 2);
    }

    #[test]
    fn unit_is_zero() {
        let rhs = Rhs::from_model(());
        let ctx = StepContext::detached(&[]);
        assert_eq!(rhs.eval(array![1.0, 2.0].view(), 0.0, &ctx).unwrap(), array![0.0, 0.0]);
    }
}
