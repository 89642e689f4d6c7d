//! Error types for frame extraction and conversion.

use grid_dataset::DatasetError;
use thiserror::Error;
use tile_catalog::TileError;

/// Errors that can occur while building or writing tidy frames.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Catalog, grid, shape or join failure.
    #[error(transparent)]
    Tile(#[from] TileError),

    /// Dataset access failure.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// No variables were requested.
    #[error("at least one variable name is required")]
    NoVariables,

    /// A variable was requested twice.
    #[error("variable '{0}' requested more than once")]
    DuplicateVariable(String),

    /// Extraction produced no rows.
    #[error("no rows extracted from {0}")]
    EmptyFrame(String),

    /// A file name does not carry a recognizable period.
    #[error("cannot derive period key from file name '{0}'")]
    PeriodKey(String),

    /// Tiles whose depth values are all missing.
    #[error("tiles with all-NaN depths: {0:?}")]
    MissingDepths(Vec<i64>),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;
