use std::error::Error as StdError;

use crate::RightHandSide;

/// The declared interface of a right-hand side written in another language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Name of the routine to bind.
    pub entry_point: String,

    /// Number of components in `u`.
    pub dimension: usize,

    /// Number of extra positional arguments the routine accepts.
    pub extra_args: usize,
}

impl Signature {
    #[must_use]
    pub fn new(entry_point: impl Into<String>, dimension: usize) -> Self {
        Self {
            entry_point: entry_point.into(),
            dimension,
            extra_args: 0,
        }
    }

    #[must_use]
    pub fn with_extra_args(mut self, extra_args: usize) -> Self {
        self.extra_args = extra_args;
        self
    }
}

/// Turns foreign source text into a callable right-hand side.
///
/// Compilation itself happens outside this crate; implementors bind whatever
/// toolchain they use and hand back a [`RightHandSide`], which
/// [`Rhs::compile`](crate::Rhs::compile) wraps for a solver.
pub trait RhsCompiler {
    type Compiled: RightHandSide + 'static;
    type Error: StdError + Send + Sync + 'static;

    /// Compiles `source` and binds the routine named by `signature`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the source does not compile or does not
    /// provide a routine matching the signature.
    fn compile(
        &self,
        source: &str,
        signature: &Signature,
    ) -> Result<Self::Compiled, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use ndarray::{ArrayView1, array};
    use thiserror::Error;

    use crate::{Rhs, StepContext};

    /// Compiles sources of the form `scale <k>` into `f(u, t) = k * u`.
    struct ScaleCompiler;

    struct Scale(f64);

    impl RightHandSide for Scale {
        type Output = Vec<f64>;
        type Error = Infallible;

        fn call(
            &self,
            u: ArrayView1<'_, f64>,
            _t: f64,
            _ctx: &StepContext<'_>,
        ) -> Result<Vec<f64>, Infallible> {
            Ok(u.iter().map(|x| self.0 * x).collect())
        }
    }

    #[derive(Debug, Error)]
    #[error("cannot parse `{0}`")]
    struct ParseError(String);

    impl RhsCompiler for ScaleCompiler {
        type Compiled = Scale;
        type Error = ParseError;

        fn compile(&self, source: &str, _signature: &Signature) -> Result<Scale, ParseError> {
            source
                .strip_prefix("scale ")
                .and_then(|k| k.trim().parse().ok())
                .map(Scale)
                .ok_or_else(|| ParseError(source.to_owned()))
        }
    }

    #[test]
    fn compiled_rhs_is_callable() {
        let signature = Signature::new("f", 2);
        let rhs = Rhs::compile(&ScaleCompiler, "scale 3", &signature).unwrap();

        let out = rhs
            .eval(array![1.0, 2.0].view(), 0.0, &StepContext::detached(&[]))
            .unwrap();
        assert_eq!(out, array![3.0, 6.0]);
    }

    #[test]
    fn compile_errors_pass_through() {
        let err = Rhs::compile(&ScaleCompiler, "double", &Signature::new("f", 1)).unwrap_err();
        assert_eq!(err.to_string(), "cannot parse `double`");
    }
}
