use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridError>;

/// Contract violations raised by grid accessors, the planner entry point and the codec.
/// Unreachable goals and cancellation are not errors, see [PathStatus](crate::planner::PathStatus).
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Cell ({row}, {col}) is outside of the {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
    #[error("Grid dimensions {rows}x{cols} are invalid, both must be positive")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("A start cell already exists at ({row}, {col})")]
    StartAlreadySet { row: usize, col: usize },
    #[error("Cell cost {0} is invalid, costs must be finite and non-negative")]
    InvalidCost(f64),
    #[error("Cost scale {0} is invalid, it must be finite and positive")]
    InvalidCostScale(f64),
    #[error("No start cell was given")]
    NoStart,
    #[error("At least one goal is required")]
    NoGoals,
    #[error("Waypoint {0:?} not found")]
    UnknownWaypoint(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
