use thiserror::Error;

/// Error types shared by all kinetic computations.
///
/// Both variants follow the fail-fast policy: they are returned the moment
/// the offending input or degenerate quantity is detected, with no silent
/// fallback. Recoverable per-unit conditions (a single grid index whose
/// optimizer did not converge, an ODE run that stopped early) are not
/// represented here; they live inside the result types of the estimators
/// and simulators.
#[derive(Debug, Error)]
pub enum KineticsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("numerical singularity: {0}")]
    NumericalSingularity(String),
}

impl KineticsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        KineticsError::InvalidArgument(msg.into())
    }

    pub fn singular(msg: impl Into<String>) -> Self {
        KineticsError::NumericalSingularity(msg.into())
    }
}
