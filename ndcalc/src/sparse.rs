//! Sparse storage
//!
//! A [`SparseMatrix`] stores only non-default cells in a hash map keyed by
//! coordinate. Absent cells read as the element default. Writing the
//! default removes the entry.
//!
//! An optional entry bound keeps memory fixed: once full, an insertion of a
//! new coordinate either evicts the oldest inserted entry or is rejected,
//! depending on the [`EvictionPolicy`]. Overwriting an existing coordinate
//! never evicts and keeps its insertion position.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use tracing::trace;

use ndcalc_core::validation::validate_in_bounds;
use ndcalc_core::{
    Annotation, Coordinate, Element, Matrix, MatrixError, Result, StorageType, Value, ValueType,
};

/// Behavior of a full bounded sparse matrix on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvictionPolicy {
    /// Drop the entry inserted first
    #[default]
    EvictOldest,
    /// Fail the insertion with `CapacityExceeded`
    Reject,
}

/// Sparse N-dimensional matrix over element type `T`
#[derive(Debug, Clone)]
pub struct SparseMatrix<T: Element> {
    size: Coordinate,
    entries: HashMap<Coordinate, (T, u64)>,
    order: BTreeMap<u64, Coordinate>,
    next_sequence: u64,
    max_entries: Option<usize>,
    eviction_policy: EvictionPolicy,
    annotation: Option<Annotation>,
}

pub type SparseDoubleMatrix = SparseMatrix<f64>;
pub type SparseObjectMatrix = SparseMatrix<Value>;

impl<T: Element> SparseMatrix<T> {
    /// Create an unbounded, empty sparse matrix
    pub fn new(size: impl Into<Coordinate>) -> Self {
        Self {
            size: size.into(),
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_sequence: 0,
            max_entries: None,
            eviction_policy: EvictionPolicy::default(),
            annotation: None,
        }
    }

    /// Create a sparse matrix holding at most `max_entries` entries
    pub fn bounded(
        size: impl Into<Coordinate>,
        max_entries: usize,
        eviction_policy: EvictionPolicy,
    ) -> Self {
        Self {
            max_entries: Some(max_entries),
            eviction_policy,
            ..Self::new(size)
        }
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Number of stored entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Read a cell, default when absent
    pub fn get(&self, coordinate: &Coordinate) -> Result<T> {
        validate_in_bounds(coordinate, &self.size)?;
        Ok(self
            .entries
            .get(coordinate)
            .map_or_else(T::default_value, |(value, _)| value.clone()))
    }

    /// Write a cell; the default value removes the entry
    pub fn set(&mut self, coordinate: &Coordinate, value: T) -> Result<()> {
        validate_in_bounds(coordinate, &self.size)?;

        if value.is_default() {
            self.remove(coordinate);
            return Ok(());
        }

        if let Some(entry) = self.entries.get_mut(coordinate) {
            entry.0 = value;
            return Ok(());
        }

        if let Some(max_entries) = self.max_entries {
            if self.entries.len() >= max_entries {
                match self.eviction_policy {
                    EvictionPolicy::Reject => {
                        return Err(MatrixError::CapacityExceeded { max_entries })
                    }
                    EvictionPolicy::EvictOldest => self.evict_oldest(),
                }
            }
            if max_entries == 0 {
                return Ok(());
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.order.insert(sequence, coordinate.clone());
        self.entries.insert(coordinate.clone(), (value, sequence));
        Ok(())
    }

    fn remove(&mut self, coordinate: &Coordinate) {
        if let Some((_, sequence)) = self.entries.remove(coordinate) {
            self.order.remove(&sequence);
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, coordinate)) = self.order.pop_first() {
            trace!(%coordinate, "evicting oldest sparse entry");
            self.entries.remove(&coordinate);
        }
    }
}

impl<T: Element> Matrix for SparseMatrix<T> {
    fn size(&self) -> Coordinate {
        self.size.clone()
    }

    fn value_type(&self) -> ValueType {
        T::value_type()
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sparse
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        Ok(self.get(coordinate)?.into_value())
    }

    fn set_value(&mut self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let value = T::from_value(&value)?;
        self.set(coordinate, value)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        validate_in_bounds(coordinate, &self.size)?;
        Ok(self
            .entries
            .get(coordinate)
            .map_or_else(|| T::default_value().to_f64(), |(value, _)| value.to_f64()))
    }

    fn set_f64(&mut self, coordinate: &Coordinate, value: f64) -> Result<()> {
        let value = T::from_f64(value)?;
        self.set(coordinate, value)
    }

    fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries.contains_key(coordinate)
    }

    /// Populated coordinates in insertion order
    fn available_coordinates(&self) -> Box<dyn Iterator<Item = Coordinate> + '_> {
        Box::new(self.order.values().cloned())
    }

    fn value_count(&self) -> u64 {
        self.entries.len() as u64
    }

    fn resize(&mut self, size: &Coordinate) -> Result<()> {
        if size.dimension_count() != self.size.dimension_count() {
            return Err(MatrixError::DimensionMismatch {
                expected: self.size.dimension_count(),
                actual: size.dimension_count(),
            });
        }

        let dropped: Vec<Coordinate> = self
            .entries
            .keys()
            .filter(|coordinate| !coordinate.is_smaller_than(size))
            .cloned()
            .collect();
        for coordinate in &dropped {
            self.remove(coordinate);
        }
        self.size = size.clone();
        Ok(())
    }

    fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(row: usize, column: usize) -> Coordinate {
        Coordinate::from([row, column])
    }

    #[test]
    fn test_absent_reads_default() {
        let matrix = SparseDoubleMatrix::new([1000, 1000]);
        assert_eq!(matrix.get_f64(&at(500, 500)).unwrap(), 0.0);
        assert!(!matrix.contains(&at(500, 500)));
        assert_eq!(matrix.value_count(), 0);
    }

    #[test]
    fn test_default_write_removes_entry() {
        let mut matrix = SparseDoubleMatrix::new([3, 3]);
        matrix.set(&at(1, 1), 2.5).unwrap();
        assert!(matrix.contains(&at(1, 1)));
        matrix.set(&at(1, 1), 0.0).unwrap();
        assert!(!matrix.contains(&at(1, 1)));
        assert_eq!(matrix.entry_count(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut matrix = SparseDoubleMatrix::new([3, 3]);
        assert!(matches!(
            matrix.set(&at(3, 0), 1.0),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
        assert!(matrix.get(&at(0, 3)).is_err());
    }

    #[test]
    fn test_evicts_oldest_insertion() {
        let mut matrix = SparseDoubleMatrix::bounded([10, 10], 2, EvictionPolicy::EvictOldest);
        matrix.set(&at(0, 0), 1.0).unwrap();
        matrix.set(&at(0, 1), 2.0).unwrap();
        // overwrite keeps (0, 0) as the oldest entry
        matrix.set(&at(0, 0), 5.0).unwrap();
        matrix.set(&at(0, 2), 3.0).unwrap();

        assert_eq!(matrix.entry_count(), 2);
        assert!(!matrix.contains(&at(0, 0)));
        assert_eq!(matrix.get(&at(0, 1)).unwrap(), 2.0);
        assert_eq!(matrix.get(&at(0, 2)).unwrap(), 3.0);
    }

    #[test]
    fn test_reject_policy() {
        let mut matrix = SparseDoubleMatrix::bounded([4], 1, EvictionPolicy::Reject);
        matrix.set(&Coordinate::from([0]), 1.0).unwrap();
        assert_eq!(
            matrix.set(&Coordinate::from([1]), 1.0),
            Err(MatrixError::CapacityExceeded { max_entries: 1 })
        );
        matrix.set(&Coordinate::from([0]), 9.0).unwrap();
        assert_eq!(matrix.get(&Coordinate::from([0])).unwrap(), 9.0);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut matrix = SparseDoubleMatrix::bounded([4], 0, EvictionPolicy::EvictOldest);
        matrix.set(&Coordinate::from([1]), 1.0).unwrap();
        assert_eq!(matrix.entry_count(), 0);
    }

    #[test]
    fn test_available_in_insertion_order() {
        let mut matrix = SparseMatrix::<i64>::new([5, 5]);
        matrix.set(&at(4, 4), 1).unwrap();
        matrix.set(&at(0, 0), 2).unwrap();
        matrix.set(&at(2, 3), 3).unwrap();
        let available: Vec<_> = matrix.available_coordinates().collect();
        assert_eq!(available, vec![at(4, 4), at(0, 0), at(2, 3)]);
    }

    #[test]
    fn test_resize_drops_out_of_range_entries() {
        let mut matrix = SparseDoubleMatrix::new([4, 4]);
        matrix.set(&at(3, 3), 1.0).unwrap();
        matrix.set(&at(1, 1), 1.0).unwrap();
        matrix.resize(&at(2, 2)).unwrap();
        assert_eq!(matrix.entry_count(), 1);
        assert!(matrix.contains(&at(1, 1)));
    }

    #[test]
    fn test_string_cells() {
        let mut matrix = SparseMatrix::<String>::new([2]);
        matrix.set_string(&Coordinate::from([1]), "hi").unwrap();
        assert_eq!(matrix.get_string(&Coordinate::from([1])).unwrap(), "hi");
        assert_eq!(matrix.get_string(&Coordinate::from([0])).unwrap(), "");
    }
}
