use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::{StepError, ValidationError};

/// The initial value of the solution.
///
/// The variant fixes whether a run treats `u` as a single number or as a
/// system of equations.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialCondition {
    Scalar(f64),
    Vector(Array1<f64>),
}

impl InitialCondition {
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Number of components in the solution.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    #[must_use]
    pub fn to_array(&self) -> Array1<f64> {
        match self {
            Self::Scalar(x) => Array1::from_elem(1, *x),
            Self::Vector(v) => v.clone(),
        }
    }

    /// Checks that the initial condition is non-empty and finite.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = self.to_array();
        if values.is_empty() {
            return Err(ValidationError::EmptyInitialCondition);
        }
        match values.iter().position(|x| !x.is_finite()) {
            Some(index) => Err(ValidationError::NonFiniteInitialCondition { index }),
            None => Ok(()),
        }
    }
}

impl From<f64> for InitialCondition {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<Vec<f64>> for InitialCondition {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(Array1::from(v))
    }
}

impl From<&[f64]> for InitialCondition {
    fn from(v: &[f64]) -> Self {
        Self::Vector(Array1::from(v.to_vec()))
    }
}

impl<const N: usize> From<[f64; N]> for InitialCondition {
    fn from(v: [f64; N]) -> Self {
        Self::Vector(Array1::from(v.to_vec()))
    }
}

impl From<Array1<f64>> for InitialCondition {
    fn from(v: Array1<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<ArrayView1<'_, f64>> for InitialCondition {
    fn from(v: ArrayView1<'_, f64>) -> Self {
        Self::Vector(v.to_owned())
    }
}

/// The accepted time levels of a solve.
///
/// Row `i` of [`Trajectory::u`] is the solution at time `t()[i]`. A
/// trajectory always holds at least the initial condition and only grows by
/// appending, so every row is a fully computed step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    u: Array2<f64>,
    t: Vec<f64>,
    scalar: bool,
}

impl Trajectory {
    /// Starts a trajectory at `t0` with the given initial condition.
    #[must_use]
    pub fn new(initial: &InitialCondition, t0: f64) -> Self {
        Self {
            u: initial.to_array().insert_axis(Axis(0)),
            t: vec![t0],
            scalar: initial.is_scalar(),
        }
    }

    /// Appends an accepted time level.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::RhsShape`] if `u` does not match the dimension.
    pub fn push(&mut self, u: ArrayView1<'_, f64>, t: f64) -> Result<(), StepError> {
        let expected = self.dimension();
        self.u
            .push_row(u)
            .map_err(|_| StepError::RhsShape {
                expected,
                found: u.len(),
            })?;
        self.t.push(t);
        Ok(())
    }

    /// Number of time levels, including the initial condition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Always `false`; a trajectory holds at least its initial condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Index of the most recently accepted step.
    #[must_use]
    pub fn n(&self) -> usize {
        self.t.len() - 1
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.u.ncols()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    /// The solution values, one row per time level.
    #[must_use]
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    #[must_use]
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    /// The solution at time level `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.u.row(i)
    }

    #[must_use]
    pub fn last(&self) -> ArrayView1<'_, f64> {
        self.u.row(self.n())
    }

    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.t[self.n()]
    }

    /// The solution as plain numbers, if the problem is scalar.
    #[must_use]
    pub fn scalar_values(&self) -> Option<Vec<f64>> {
        self.scalar.then(|| self.u.column(0).to_vec())
    }

    #[must_use]
    pub fn into_parts(self) -> (Array2<f64>, Vec<f64>) {
        (self.u, self.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn scalar_trajectory_grows_by_rows() {
        let mut trajectory = Trajectory::new(&1.0.into(), 0.0);
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.n(), 0);
        assert!(trajectory.is_scalar());

        trajectory.push(array![0.5].view(), 0.1).unwrap();

        assert_eq!(trajectory.n(), 1);
        assert_eq!(trajectory.t(), &[0.0, 0.1]);
        assert_eq!(trajectory.scalar_values(), Some(vec![1.0, 0.5]));
        assert_eq!(trajectory.last_time(), 0.1);
    }

    #[test]
    fn vector_trajectory_rejects_wrong_length() {
        let mut trajectory = Trajectory::new(&[1.0, 2.0].into(), 0.0);
        assert_eq!(trajectory.dimension(), 2);
        assert_eq!(trajectory.scalar_values(), None);

        let err = trajectory.push(array![1.0].view(), 1.0).unwrap_err();
        assert!(matches!(err, StepError::RhsShape { expected: 2, found: 1 }));
        assert_eq!(trajectory.len(), 1);
    }

    #[test]
    fn initial_condition_validation() {
        assert!(InitialCondition::from(vec![1.0, 2.0]).validate().is_ok());
        assert_eq!(
            InitialCondition::from(Vec::new()).validate(),
            Err(ValidationError::EmptyInitialCondition)
        );
        assert_eq!(
            InitialCondition::from([0.0, f64::NAN]).validate(),
            Err(ValidationError::NonFiniteInitialCondition { index: 1 })
        );
    }
}
