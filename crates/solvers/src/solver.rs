//! The solver lifecycle.
//!
//! A [`Solver`] binds a right-hand side to an integration [`Method`] and runs
//! it over a list of requested time points:
//!
//! ```text
//! new / with_config ──> Configured ──solve──> InitializedForSolve ──> Stepping ──> Done
//!        set(..) ─┘         │                                                       │
//!   set_initial_condition ──┘            Failed <── any error ───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use skein_core::Rhs;
//! use skein_solvers::Solver;
//!
//! // u' = -u, u(0) = 1
//! let mut solver = Solver::by_name("RK4", Rhs::scalar(|u, _t| -u))?;
//! solver.set_initial_condition(1.0)?;
//!
//! let solution = solver.solve_to_end(&[0.0, 0.5, 1.0])?;
//! let u = solution.trajectory.scalar_values().unwrap();
//! assert!((u[2] - (-1.0_f64).exp()).abs() < 1e-3);
//! # Ok::<(), skein_solvers::Error>(())
//! ```

mod phase;
mod solution;


pub use phase::Phase;
pub use solution::{Solution, Status};

use std::{collections::BTreeMap, fmt, iter, rc::Rc};

use log::{debug, trace};
use ndarray::Array2;
use skein_core::{
    ConfigError, Configuration, InitialCondition, ParameterSpec, Rhs, Step, Terminate, Trajectory,
    Value,
};

use crate::{Error, Method, Parameters, Pipeline, catalog, registry};

/// Parameters every solver accepts, ahead of the method's own layers.
const BASE_PARAMETERS: Parameters = Parameters::optional(&["f_args", "f_kwargs"]);

/// An empty set of configuration entries.
pub const NO_CONFIG: [(&str, Value); 0] = [];

/// Integrates `u' = f(u, t)` with one integration method.
///
/// A solver owns its configuration, its initial condition, and the
/// trajectory of its most recent solve. Each call to [`Solver::solve`] starts
/// from the current initial condition with fresh method state.
pub struct Solver {
    method: Rc<dyn Method>,
    rhs: Rhs,
    config: Configuration,
    pipeline: Pipeline,
    initial: Option<InitialCondition>,
    trajectory: Option<Trajectory>,
    phase: Phase,
}

impl Solver {
    /// Creates a solver with the method's default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the method lists an unregistered
    /// parameter or its `adjust` hook fails.
    pub fn new<M: Method + 'static>(method: M, rhs: Rhs) -> Result<Self, Error> {
        Self::from_method(Rc::new(method), rhs, NO_CONFIG)
    }

    /// Creates a solver and applies initial configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any entry is unknown or invalid.
    pub fn with_config<M, I, K, V>(method: M, rhs: Rhs, config: I) -> Result<Self, Error>
    where
        M: Method + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Self::from_method(Rc::new(method), rhs, config)
    }

    /// Creates a solver for a built-in method looked up by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if no built-in method has that name.
    pub fn by_name(name: &str, rhs: Rhs) -> Result<Self, Error> {
        let method = catalog::method(name).ok_or_else(|| Error::UnknownMethod {
            name: name.to_owned(),
        })?;
        Self::from_method(method, rhs, NO_CONFIG)
    }

    /// Creates a solver for a shared method instance.
    ///
    /// The configuration is resolved from the base parameters followed by the
    /// method's layers, the entries in `config` are applied, and finally the
    /// method's `adjust` hook runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if resolution, assignment, or adjustment fails.
    pub fn from_method<I, K, V>(method: Rc<dyn Method>, rhs: Rhs, config: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let layers: Vec<Parameters> = iter::once(BASE_PARAMETERS)
            .chain(method.parameters())
            .collect();
        let required: Vec<&str> = layers.iter().flat_map(|l| l.required.iter().copied()).collect();
        let optional: Vec<&str> = layers.iter().flat_map(|l| l.optional.iter().copied()).collect();

        let mut configuration = Configuration::new(registry(), &required, &optional)?;
        configuration.set_many(config)?;
        method.adjust(&mut configuration)?;

        let pipeline = Pipeline::new(method.validators());

        Ok(Self {
            method,
            rhs,
            config: configuration,
            pipeline,
            initial: None,
            trajectory: None,
            phase: Phase::Configured,
        })
    }

    /// Validates and assigns one configuration value.
    ///
    /// # Errors
    ///
    /// See [`Solver::set_many`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.set_many([(name, value.into())])
    }

    /// Validates and assigns several configuration values at once.
    ///
    /// The method's `adjust` hook runs after the assignment. If anything
    /// fails, the configuration is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a name is unknown to this solver or a
    /// value fails its parameter spec.
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut next = self.config.clone();
        next.set_many(entries)?;
        self.method.adjust(&mut next)?;
        self.config = next;
        Ok(())
    }

    /// Returns the current value of one parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the name is unknown to this solver.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, Error> {
        Ok(self.config.get(name)?)
    }

    /// Iterates over all current configuration values.
    pub fn parameters(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.config.values()
    }

    /// The registered spec of one of this solver's parameters.
    #[must_use]
    pub fn parameter_info(&self, name: &str) -> Option<&ParameterSpec> {
        self.config.spec(name)
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub fn method(&self) -> &dyn Method {
        self.method.as_ref()
    }

    #[must_use]
    pub fn rhs(&self) -> &Rhs {
        &self.rhs
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sets the initial condition for the next solve.
    ///
    /// A number makes the problem scalar; a sequence makes it a system. The
    /// trajectory of any previous solve is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the value is empty or not finite.
    pub fn set_initial_condition(&mut self, u0: impl Into<InitialCondition>) -> Result<(), Error> {
        let u0 = u0.into();
        u0.validate()?;
        self.initial = Some(u0);
        self.trajectory = None;
        self.phase = Phase::Configured;
        Ok(())
    }

    #[must_use]
    pub fn initial_condition(&self) -> Option<&InitialCondition> {
        self.initial.as_ref()
    }

    /// Integrates over `time_points`, consulting `terminate` after each step.
    ///
    /// # Algorithm
    ///
    /// 1. Check that an initial condition is set and every required
    ///    parameter has a value.
    /// 2. Initialize: allocate the trajectory with `u[0]` at `time_points[0]`,
    ///    then let the method build its step advancer.
    /// 3. Validate: run the base checks on the time points, then the
    ///    method's own checks. A failure here takes no step.
    /// 4. Step: for each `n`, ask the advancer for `u[n + 1]`, append it, and
    ///    call `terminate(trajectory, n + 1)`. Stop when it returns `true`.
    ///
    /// # Errors
    ///
    /// Configuration and validation errors are returned before any step.
    /// A step error returns [`Error::Step`] with the levels accepted so far,
    /// which also remain available through [`Solver::trajectory`].
    pub fn solve<T: Terminate>(
        &mut self,
        time_points: &[f64],
        mut terminate: T,
    ) -> Result<Solution, Error> {
        let Some(initial) = self.initial.clone() else {
            return Err(self.fail(Error::MissingInitialCondition));
        };
        if let Err(err) = self.config.check_required() {
            return Err(self.fail(err));
        }
        let (args, kwargs) = match self.extra_args() {
            Ok(extra) => extra,
            Err(err) => return Err(self.fail(err)),
        };

        // Initialize: base allocation first, then the method.
        let Some(&t0) = time_points.first() else {
            return Err(self.fail(skein_core::ValidationError::EmptyTimePoints));
        };
        let mut trajectory = Trajectory::new(&initial, t0);
        self.trajectory = Some(trajectory.clone());

        let mut advancer = match self.method.build(self, time_points) {
            Ok(advancer) => advancer,
            Err(err) => return Err(self.fail(err)),
        };
        self.phase = Phase::InitializedForSolve;

        if let Err(err) = self.pipeline.run(&self.config, time_points) {
            return Err(self.fail(err));
        }
        self.phase = Phase::Stepping;

        let evaluations_before = self.rhs.evaluations();

        debug!(
            "solving with {} over {} time points (dimension {})",
            self.describe(),
            time_points.len(),
            trajectory.dimension()
        );

        let mut status = Status::Complete;
        for n in 0..time_points.len() - 1 {
            let result = {
                let step = Step::new(&trajectory, time_points, &self.rhs, &args, &kwargs);
                advancer.advance(&step)
            };

            if let Err(source) =
                result.and_then(|u| trajectory.push(u.view(), time_points[n + 1]))
            {
                debug!("step from level {n} failed: {source}");
                self.trajectory = Some(trajectory.clone());
                self.phase = Phase::Failed;
                return Err(Error::Step {
                    step: n,
                    source,
                    partial: trajectory,
                });
            }
            trace!("accepted level {} at t = {}", n + 1, time_points[n + 1]);

            if terminate.terminate(&trajectory, n + 1) {
                status = Status::Terminated;
                break;
            }
        }

        debug!(
            "finished after {} steps and {} rhs evaluations ({status:?})",
            trajectory.n(),
            self.rhs.evaluations() - evaluations_before
        );

        self.trajectory = Some(trajectory.clone());
        self.phase = Phase::Done;

        Ok(Solution {
            status,
            steps: trajectory.n(),
            trajectory,
        })
    }

    /// Integrates over all of `time_points` without a termination predicate.
    ///
    /// # Errors
    ///
    /// See [`Solver::solve`].
    pub fn solve_to_end(&mut self, time_points: &[f64]) -> Result<Solution, Error> {
        self.solve(time_points, ())
    }

    /// Creates an independent solver for another built-in method.
    ///
    /// See [`Solver::switch_to_method`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if no built-in method has that name,
    /// or [`Error::Config`] if an override is invalid.
    pub fn switch_to<I, K, V>(&self, name: &str, overrides: I) -> Result<Solver, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let method = catalog::method(name).ok_or_else(|| Error::UnknownMethod {
            name: name.to_owned(),
        })?;
        self.switch_to_method(method, overrides)
    }

    /// Creates an independent solver for `method`.
    ///
    /// The new solver shares the right-hand side and copies the initial
    /// condition and every configuration value whose parameter it also
    /// accepts, then applies `overrides`. Nothing is aliased, so later
    /// changes to either solver do not affect the other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an override is unknown or invalid.
    pub fn switch_to_method<I, K, V>(
        &self,
        method: Rc<dyn Method>,
        overrides: I,
    ) -> Result<Solver, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut next = Solver::from_method(method, self.rhs.clone(), NO_CONFIG)?;

        let mut config = next.config.clone();
        for (name, value) in self.config.values() {
            if !config.contains(name) {
                continue;
            }
            if self.config.is_explicit(name) {
                config.set(name, value.clone())?;
            } else {
                config.set_derived(name, value.clone())?;
            }
        }
        config.set_many(overrides)?;
        next.method.adjust(&mut config)?;

        next.config = config;
        next.initial.clone_from(&self.initial);
        Ok(next)
    }

    /// A short identifier: the method name plus any identity parameters
    /// explicitly set to a non-default value, e.g. `ThetaRule(theta=0)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let distinguishing: Vec<String> = self
            .method
            .identity()
            .iter()
            .filter(|name| self.config.is_explicit(name))
            .filter_map(|name| {
                let value = self.config.get(name).ok().flatten()?;
                let default = self.config.spec(name).and_then(ParameterSpec::default);
                match default {
                    Some(default) if default.same_as(value) => None,
                    _ => Some(format!("{name}={value}")),
                }
            })
            .collect();

        if distinguishing.is_empty() {
            self.method.name().to_owned()
        } else {
            format!("{}({})", self.method.name(), distinguishing.join(", "))
        }
    }

    /// The trajectory of the most recent solve, including partial results.
    #[must_use]
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Solution values of the most recent solve, one row per time level.
    #[must_use]
    pub fn u(&self) -> Option<&Array2<f64>> {
        self.trajectory.as_ref().map(Trajectory::u)
    }

    /// Times of the most recent solve.
    #[must_use]
    pub fn t(&self) -> Option<&[f64]> {
        self.trajectory.as_ref().map(Trajectory::t)
    }

    /// Index of the last accepted level of the most recent solve.
    #[must_use]
    pub fn n(&self) -> Option<usize> {
        self.trajectory.as_ref().map(Trajectory::n)
    }

    /// The `f_args` and `f_kwargs` passed to every right-hand side call.
    fn extra_args(&self) -> Result<(Vec<f64>, BTreeMap<String, f64>), ConfigError> {
        let args = self.config.floats("f_args")?.unwrap_or_default().to_vec();
        let kwargs = self.config.map("f_kwargs")?.cloned().unwrap_or_default();
        Ok((args, kwargs))
    }

    fn fail(&mut self, err: impl Into<Error>) -> Error {
        self.phase = Phase::Failed;
        err.into()
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("method", &self.method.name())
            .field("config", &self.config)
            .field("initial", &self.initial)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
