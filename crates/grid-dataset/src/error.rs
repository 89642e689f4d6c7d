//! Error types for dataset access.

use thiserror::Error;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Error types for dataset access.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Variable (data or coordinate) is not present in the dataset
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// Dimension is not present on the dataset or variable
    #[error("dimension not found: {0}")]
    DimensionNotFound(String),

    /// Array shape does not agree with the declared dimensions
    #[error("shape mismatch for '{name}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Positional index past the end of a dimension
    #[error("index {index} out of range for dimension '{dim}' of length {len}")]
    IndexOutOfRange { dim: String, index: usize, len: usize },

    /// Time coordinate units could not be interpreted
    #[error("invalid time units: {0}")]
    InvalidTimeUnits(String),

    /// Invalid data format
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DatasetError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<ndarray::ShapeError> for DatasetError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}
