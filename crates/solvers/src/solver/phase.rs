/// Where a solver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed and configured; configuration and the initial condition
    /// may still change.
    Configured,

    /// Storage is allocated and the method's advancer is built.
    InitializedForSolve,

    /// Validation passed and steps are being taken.
    Stepping,

    /// The last solve finished, either at the final time point or because
    /// the termination predicate stopped it.
    Done,

    /// The last operation failed with an unrecoverable error.
    Failed,
}
