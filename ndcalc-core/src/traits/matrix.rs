//! Core matrix contract
//!
//! This module defines the read/write interface every matrix satisfies,
//! regardless of value type or storage discipline. Renderers, codecs and
//! wrappers around other libraries consume matrices only through it.

use crate::types::constants::{COLUMN, ROW};
use crate::{
    Annotation, Coordinate, CoordinateIter, MatrixError, Result, StorageType, Value, ValueType,
};

/// Read/write access to an N-dimensional matrix
///
/// Implementations provide the untyped `get_value` / `set_value` pair for
/// their declared [`ValueType`]; the typed accessors default to coercing
/// through [`Value`] and may be overridden with direct reads.
pub trait Matrix: Send + Sync {
    /// Per-dimension exclusive upper bounds
    fn size(&self) -> Coordinate;

    /// Declared content type
    fn value_type(&self) -> ValueType;

    /// Declared storage discipline
    fn storage_type(&self) -> StorageType;

    /// Read one cell
    ///
    /// Fails with `IndexOutOfBounds` if `coordinate` is outside
    /// [`Matrix::size`].
    fn get_value(&self, coordinate: &Coordinate) -> Result<Value>;

    /// Write one cell, coercing `value` to the declared type
    fn set_value(&mut self, coordinate: &Coordinate, value: Value) -> Result<()>;

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.get_value(coordinate)?.to_f64())
    }

    fn set_f64(&mut self, coordinate: &Coordinate, value: f64) -> Result<()> {
        self.set_value(coordinate, Value::Double(value))
    }

    fn get_i64(&self, coordinate: &Coordinate) -> Result<i64> {
        self.get_value(coordinate)?.to_i64()
    }

    fn set_i64(&mut self, coordinate: &Coordinate, value: i64) -> Result<()> {
        self.set_value(coordinate, Value::Long(value))
    }

    fn get_bool(&self, coordinate: &Coordinate) -> Result<bool> {
        self.get_value(coordinate)?.to_bool()
    }

    fn set_bool(&mut self, coordinate: &Coordinate, value: bool) -> Result<()> {
        self.set_value(coordinate, Value::Boolean(value))
    }

    fn get_string(&self, coordinate: &Coordinate) -> Result<String> {
        Ok(self.get_value(coordinate)?.to_string())
    }

    fn set_string(&mut self, coordinate: &Coordinate, value: &str) -> Result<()> {
        self.set_value(coordinate, Value::String(value.to_owned()))
    }

    /// Whether `coordinate` is in bounds (and, for sparse storage, populated)
    fn contains(&self, coordinate: &Coordinate) -> bool {
        let size = self.size();
        coordinate.dimension_count() == size.dimension_count() && coordinate.is_smaller_than(&size)
    }

    /// Every in-bounds coordinate
    fn all_coordinates(&self) -> CoordinateIter {
        CoordinateIter::new(self.size())
    }

    /// Only the populated coordinates; every coordinate for dense storage
    fn available_coordinates(&self) -> Box<dyn Iterator<Item = Coordinate> + '_> {
        Box::new(self.all_coordinates())
    }

    /// Number of populated (sparse) or total (dense) cells
    fn value_count(&self) -> u64 {
        self.size().product() as u64
    }

    /// Change the size, keeping cells that remain in bounds
    ///
    /// Storage that cannot grow reports `Unsupported`.
    fn resize(&mut self, size: &Coordinate) -> Result<()> {
        let _ = size;
        Err(MatrixError::Unsupported { operation: "resize" })
    }

    fn annotation(&self) -> Option<&Annotation>;

    fn set_annotation(&mut self, annotation: Option<Annotation>);

    /// Row-major cell buffer for dense DOUBLE storage
    ///
    /// Reductions use this to skip per-cell dispatch.
    fn as_f64_slice(&self) -> Option<&[f64]> {
        None
    }

    fn dimension_count(&self) -> usize {
        self.size().dimension_count()
    }

    fn row_count(&self) -> usize {
        self.size().as_slice().get(ROW).copied().unwrap_or(1)
    }

    fn column_count(&self) -> usize {
        self.size().as_slice().get(COLUMN).copied().unwrap_or(1)
    }
}
