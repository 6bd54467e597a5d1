//! Error types for the convnet library.
//!
//! Every fallible operation in the engine returns `Result<T>` with this error
//! type. Validation failures are raised at the point of detection and
//! propagate to the caller; the core never retries or recovers.

use thiserror::Error;

/// All error conditions produced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller-supplied parameter: zero dimension, mismatched layer shape,
    /// unknown padding or activation name, invalid reshape target.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Element access outside the matrix bounds.
    #[error("index ({row}, {column}) out of bounds for {rows}x{columns} matrix")]
    OutOfBounds {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    /// Binary matrix operation on incompatible shapes.
    #[error("{op}: dimensions {lhs_rows}x{lhs_columns} and {rhs_rows}x{rhs_columns} are incompatible")]
    DimensionMismatch {
        op: &'static str,
        lhs_rows: usize,
        lhs_columns: usize,
        rhs_rows: usize,
        rhs_columns: usize,
    },

    /// Binary tensor operation on tensors of different depth.
    #[error("{op}: tensor depths {lhs} and {rhs} do not match")]
    DepthMismatch {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },

    /// Reached a path that is deliberately not implemented, or a call-order
    /// violation such as `backward` without a preceding `forward`.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Architecture config file could not be read.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Architecture config file is not valid JSON.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
