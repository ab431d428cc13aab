use skein_core::Trajectory;

/// Indicates how a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the last requested time point.
    Complete,

    /// Stopped early by the termination predicate.
    Terminated,
}

/// The result of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// How the solve ended.
    pub status: Status,

    /// Every accepted time level, starting with the initial condition.
    pub trajectory: Trajectory,

    /// Number of steps taken.
    pub steps: usize,
}
