//! Error types for matrix and calculation operations

use thiserror::Error;

use crate::{Coordinate, StorageType, ValueType};

/// Hint attached to an in-place calculation whose result size differs from
/// its source.
pub const ORIG_SIZE_HINT: &str = "use NEW or LINK instead";

/// Hint attached to entrywise operations over differently sized operands.
pub const OPERAND_SIZE_HINT: &str = "operands must have equal sizes";

/// Errors that can occur during matrix operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Two sizes that must agree do not
    #[error("size mismatch: expected {expected}, got {actual} ({hint})")]
    SizeMismatch {
        expected: Coordinate,
        actual: Coordinate,
        hint: &'static str,
    },

    /// Coordinate outside the declared size
    #[error("coordinate {coordinate} out of bounds for size {size}")]
    IndexOutOfBounds {
        coordinate: Coordinate,
        size: Coordinate,
    },

    /// Coordinate or size vectors with different dimension counts
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Write attempted on a read-only-by-design surface
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    /// A value could not be coerced to the requested type
    #[error("cannot convert {value:?} from {from} to {to}")]
    Conversion {
        from: ValueType,
        to: ValueType,
        value: String,
    },

    /// Sparse storage is full and configured to reject new entries
    #[error("sparse capacity of {max_entries} entries exceeded")]
    CapacityExceeded { max_entries: usize },

    /// A selection string could not be parsed
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// An argument is outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No storage backend registered for the combination
    #[error("no backend registered for {value_type} {storage_type} matrices")]
    Backend {
        value_type: ValueType,
        storage_type: StorageType,
    },
}

/// Broad classification of [`MatrixError`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Programming contract violation (sizes, bounds, arguments)
    Contract,
    /// Value coercion failure
    Coercion,
    /// Operation not offered by the target
    Unsupported,
    /// Storage capacity or configuration limits
    Capacity,
}

impl MatrixError {
    /// Create a `SizeMismatch` error for an in-place calculation
    pub fn orig_size_mismatch(source: Coordinate, calculation: Coordinate) -> Self {
        Self::SizeMismatch {
            expected: source,
            actual: calculation,
            hint: ORIG_SIZE_HINT,
        }
    }

    /// Create an `IndexOutOfBounds` error
    pub fn out_of_bounds(coordinate: &Coordinate, size: &Coordinate) -> Self {
        Self::IndexOutOfBounds {
            coordinate: coordinate.clone(),
            size: size.clone(),
        }
    }

    /// Create a `Conversion` error
    pub fn conversion(from: ValueType, to: ValueType, value: impl ToString) -> Self {
        Self::Conversion {
            from,
            to,
            value: value.to_string(),
        }
    }

    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatrixError::SizeMismatch { .. }
            | MatrixError::IndexOutOfBounds { .. }
            | MatrixError::DimensionMismatch { .. }
            | MatrixError::InvalidSelection(_)
            | MatrixError::InvalidArgument(_) => ErrorCategory::Contract,
            MatrixError::Conversion { .. } => ErrorCategory::Coercion,
            MatrixError::Unsupported { .. } => ErrorCategory::Unsupported,
            MatrixError::CapacityExceeded { .. } | MatrixError::Backend { .. } => {
                ErrorCategory::Capacity
            }
        }
    }
}

/// Result type for matrix operations
pub type Result<T> = core::result::Result<T, MatrixError>;
