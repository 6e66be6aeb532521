//! Coordinate and size validation
//!
//! Checked counterparts of the panicking coordinate helpers, used wherever
//! a bad coordinate comes from the caller rather than from internal
//! iteration.

use crate::{Coordinate, MatrixError, Result};

/// Validate that two vectors have the same dimension count
pub fn validate_same_dimensions(expected: &Coordinate, actual: &Coordinate) -> Result<()> {
    if expected.dimension_count() != actual.dimension_count() {
        return Err(MatrixError::DimensionMismatch {
            expected: expected.dimension_count(),
            actual: actual.dimension_count(),
        });
    }
    Ok(())
}

/// Validate that `coordinate` addresses a cell of `size`
pub fn validate_in_bounds(coordinate: &Coordinate, size: &Coordinate) -> Result<()> {
    validate_same_dimensions(size, coordinate)?;
    if !coordinate.is_smaller_than(size) {
        return Err(MatrixError::out_of_bounds(coordinate, size));
    }
    Ok(())
}

/// Validate that two sizes are equal
pub fn validate_same_size(
    expected: &Coordinate,
    actual: &Coordinate,
    hint: &'static str,
) -> Result<()> {
    if expected != actual {
        return Err(MatrixError::SizeMismatch {
            expected: expected.clone(),
            actual: actual.clone(),
            hint,
        });
    }
    Ok(())
}

/// Validate that `axis` exists in `size`
pub fn validate_axis(size: &Coordinate, axis: usize) -> Result<()> {
    if axis >= size.dimension_count() {
        return Err(MatrixError::InvalidArgument(format!(
            "axis {axis} does not exist in a {}-dimensional matrix",
            size.dimension_count()
        )));
    }
    Ok(())
}

/// Validate that every index lies within the extent of `axis`
pub fn validate_indices(indices: &[usize], size: &Coordinate, axis: usize) -> Result<()> {
    validate_axis(size, axis)?;
    match indices.iter().find(|&&index| index >= size[axis]) {
        Some(&index) => Err(MatrixError::out_of_bounds(
            &Coordinate::zeros(size.dimension_count()).with_axis(axis, index),
            size,
        )),
        None => Ok(()),
    }
}
