//! Error types for tile cataloguing.

use grid_dataset::DatasetError;
use thiserror::Error;

/// Errors raised while building or querying a tile catalog.
///
/// None of these are recovered locally: each one means the inputs are not
/// consistent and the batch for that partition or file must stop.
#[derive(Error, Debug)]
pub enum TileError {
    /// Two datasets do not share the same coordinate grid.
    #[error("grid mismatch: expected hash {expected}, got {actual}")]
    GridMismatch { expected: String, actual: String },

    /// A coordinate variable is not 1-D.
    #[error("curvilinear grids are not supported: coordinate '{0}' is not 1-D")]
    CurvilinearGrid(String),

    /// None of the candidate coordinate names exist in the dataset.
    #[error("no {axis} coordinate found (tried {candidates:?})")]
    MissingCoordinate {
        axis: String,
        candidates: Vec<String>,
    },

    /// The categorical sea value could not be determined.
    #[error("cannot resolve sea value for mask '{0}'")]
    UnresolvedSeaValue(String),

    /// Bitfield decoding needs a positive bit.
    #[error("sea bit must be a positive integer, got {0}")]
    InvalidSeaBit(i64),

    /// The mask variable lacks a required dimension.
    #[error("mask variable '{variable}' has no '{dim}' dimension")]
    MissingMaskDimension { variable: String, dim: String },

    /// An array does not match the catalog grid.
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A join between frames is not one-to-one.
    #[error("join on '{variable}' is not one-to-one: {detail}")]
    JoinCardinality { variable: String, detail: String },

    /// Parallel inputs have different lengths.
    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    /// Tile id outside `[0, count)`.
    #[error("tile id {tile_id} out of range (catalog has {count} tiles)")]
    TileOutOfRange { tile_id: i64, count: usize },

    /// A named table column is absent.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A column exists but holds the wrong kind of values.
    #[error("column '{column}' is not {expected}")]
    ColumnType { column: String, expected: String },

    /// Underlying dataset access failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`TileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Inputs do not describe comparable grids.
    Identity,
    /// The sea/land convention could not be decoded.
    MaskDecoding,
    /// Shapes or join cardinalities disagree.
    Shape,
    /// A tile, column, variable or dimension does not exist.
    Lookup,
    /// Bad configuration.
    Config,
}

impl TileError {
    /// Create a GridMismatch error.
    pub fn grid_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::GridMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(context: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a JoinCardinality error.
    pub fn join_cardinality(variable: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::JoinCardinality {
            variable: variable.into(),
            detail: detail.into(),
        }
    }

    /// Create a ColumnType error.
    pub fn column_type(column: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ColumnType {
            column: column.into(),
            expected: expected.into(),
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GridMismatch { .. } | Self::CurvilinearGrid(_) | Self::MissingCoordinate { .. } => {
                ErrorCategory::Identity
            }
            Self::UnresolvedSeaValue(_) | Self::InvalidSeaBit(_) | Self::MissingMaskDimension { .. } => {
                ErrorCategory::MaskDecoding
            }
            Self::ShapeMismatch { .. } | Self::JoinCardinality { .. } | Self::LengthMismatch(_) => {
                ErrorCategory::Shape
            }
            Self::TileOutOfRange { .. } | Self::ColumnNotFound(_) | Self::ColumnType { .. } => {
                ErrorCategory::Lookup
            }
            Self::Dataset(DatasetError::ShapeMismatch { .. }) => ErrorCategory::Shape,
            Self::Dataset(_) => ErrorCategory::Lookup,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type for tile catalog operations.
pub type Result<T> = std::result::Result<T, TileError>;
