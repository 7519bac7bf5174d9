//! Error types for voxelcut.

use thiserror::Error;

/// The main error type for voxelcut operations.
#[derive(Error, Debug)]
pub enum VoxelcutError {
    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A coordinate has a different dimensionality than the grid.
    #[error("dimension mismatch: grid has {grid} dimensions, coordinate has {coord}")]
    DimensionMismatch { grid: usize, coord: usize },

    /// A coordinate component lies outside the grid extents.
    #[error("coordinate {value} out of range for dimension {dim} (extent {extent})")]
    OutOfRange { dim: usize, value: u32, extent: u32 },

    /// A grid was constructed with a zero extent.
    #[error("grid has zero extent along dimension {0}")]
    EmptyGrid(usize),

    /// The configured block count cannot partition the grid.
    #[error("cannot split extent {extent} into {blocks} blocks")]
    InvalidBlockCount { blocks: usize, extent: u32 },

    /// A parameter value is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for voxelcut operations.
pub type Result<T> = std::result::Result<T, VoxelcutError>;
