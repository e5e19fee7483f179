use thiserror::Error;

/// Errors raised by the tabulated function engine and the containers built on it.
///
/// Evaluating a function outside its domain is not an error: tabulated
/// functions are zero-extended and simply return 0 there.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DryadError {
    /// Structural violation of a grid: too few points, unsorted values,
    /// illegal jumps or inconsistent region data.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The operation is not defined for the operand (e.g. arithmetic on a
    /// table that still has non linear-linear regions).
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A scalar argument was outside its accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DryadError>;
