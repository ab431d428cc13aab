use crate::Trajectory;

/// Decides, after each accepted step, whether a solve should stop.
///
/// The predicate is called once per accepted step with the trajectory as it
/// stands and the index of the level just appended. It only ever sees fully
/// computed levels. Returning `true` stops the solve, and the result holds
/// exactly the levels taken so far.
///
/// Closures automatically implement `Terminate`, and a built-in impl for `()`
/// never stops.
pub trait Terminate {
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool;
}

/// Blanket implementation for predicate closures.
impl<F> Terminate for F
where
    F: FnMut(&Trajectory, usize) -> bool,
{
    fn terminate(&mut self, trajectory: &Trajectory, step_no: usize) -> bool {
        self(trajectory, step_no)
    }
}

/// A predicate that never stops the solve.
impl Terminate for () {
    fn terminate(&mut self, _trajectory: &Trajectory, _step_no: usize) -> bool {
        false
    }
}
