use ndarray::{Array1, ArrayView1};
use skein_core::{Step, StepError};

/// Coefficients of an explicit Runge-Kutta formula.
///
/// Row `i` of `a` holds the weights of the earlier stages used to form stage
/// `i`; it has exactly `i` entries.
#[derive(Debug)]
pub(crate) struct Tableau {
    pub c: &'static [f64],
    pub a: &'static [&'static [f64]],
    pub b: &'static [f64],
}

impl Tableau {
    /// Evaluates every stage derivative for a step of size `dt` from `(u, t)`.
    pub fn stages(
        &self,
        step: &Step<'_>,
        u: ArrayView1<'_, f64>,
        t: f64,
        dt: f64,
    ) -> Result<Vec<Array1<f64>>, StepError> {
        let mut k: Vec<Array1<f64>> = Vec::with_capacity(self.c.len());
        for (c, row) in self.c.iter().zip(self.a) {
            let stage = combine(u, dt, row, &k);
            k.push(step.f(stage.view(), t + c * dt)?);
        }
        Ok(k)
    }

    /// Takes one step of size `dt` from `(u, t)`.
    pub fn step(
        &self,
        step: &Step<'_>,
        u: ArrayView1<'_, f64>,
        t: f64,
        dt: f64,
    ) -> Result<Array1<f64>, StepError> {
        let k = self.stages(step, u, t, dt)?;
        Ok(combine(u, dt, self.b, &k))
    }
}

/// Returns `u + dt * sum(weights[i] * k[i])`.
pub(crate) fn combine(
    u: ArrayView1<'_, f64>,
    dt: f64,
    weights: &[f64],
    k: &[Array1<f64>],
) -> Array1<f64> {
    let mut next = u.to_owned();
    for (w, k_i) in weights.iter().zip(k) {
        if *w != 0.0 {
            next.scaled_add(dt * w, k_i);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use approx::assert_relative_eq;
    use ndarray::array;
    use skein_core::{Rhs, Trajectory};

    const MIDPOINT: Tableau = Tableau {
        c: &[0.0, 0.5],
        a: &[&[], &[0.5]],
        b: &[0.0, 1.0],
    };

    #[test]
    fn stages_use_earlier_stages() {
        // u' = t, so every stage only depends on its time.
        let rhs = Rhs::new(|_u, t| t);
        let trajectory = Trajectory::new(&0.0.into(), 0.0);
        let kwargs = BTreeMap::new();
        let step = Step::new(&trajectory, &[0.0, 1.0], &rhs, &[], &kwargs);

        let k = MIDPOINT.stages(&step, step.u(), 0.0, 1.0).unwrap();
        assert_eq!(k, vec![array![0.0], array![0.5]]);

        let next = MIDPOINT.step(&step, step.u(), 0.0, 1.0).unwrap();
        assert_relative_eq!(next[0], 0.5);
    }

    #[test]
    fn combine_skips_zero_weights() {
        let k = [array![1.0, 1.0], array![f64::NAN, f64::NAN]];
        let next = combine(array![1.0, 2.0].view(), 0.5, &[2.0, 0.0], &k);
        assert_eq!(next, array![2.0, 3.0]);
    }
}
