use thiserror::Error;

/// Failure modes of a planning request.
///
/// Validation problems are reported eagerly before the search starts;
/// search-time failures degrade to [`PlanningError::NoPath`] instead of
/// panicking.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanningError {
    #[error("pose contains a non-finite component")]
    NonFinitePose,

    #[error("resolution must be positive, got {0}")]
    InvalidResolution(f64),

    #[error("vehicle geometry is degenerate: {0}")]
    InvalidVehicle(&'static str),

    #[error("obstacle set is empty; the grid bounds derive from the obstacle extent")]
    EmptyObstacles,

    #[error("{which} pose lies outside the obstacle grid")]
    PoseOutOfBounds { which: &'static str },

    #[error("{which} pose is in collision")]
    PoseInCollision { which: &'static str },

    #[error("no path found under the current discretization and cost model")]
    NoPath,

    #[error("planning was cancelled")]
    Cancelled,

    #[error("state vector has {actual} components, model expects {expected}")]
    StateSizeMismatch { expected: usize, actual: usize },
}
