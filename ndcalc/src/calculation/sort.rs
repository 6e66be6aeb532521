//! Row ordering by the values of one column
//!
//! [`SortIndex`] yields, for each output row, the source row that belongs
//! there: a `[rows, 1]` LONG matrix. [`Sort`] applies that permutation to
//! the whole source. Both order ascending with a stable sort, so equal keys
//! keep their source order; NaN and null keys sort last.

use std::sync::Arc;

use ndcalc_core::validation::{validate_axis, validate_in_bounds, validate_indices};
use ndcalc_core::{
    Annotation, Coordinate, MatrixError, Result, StorageType, Value, ValueType, COLUMN, ROW,
};
use tracing::trace;

use super::memo::Memo;
use super::Calculation;
use crate::handle::MatrixHandle;

/// Permutation that sorts the source rows by one column
pub struct SortIndex {
    sources: Vec<MatrixHandle>,
    column: usize,
    permutation: Memo<Arc<Vec<usize>>>,
}

impl SortIndex {
    pub fn new(source: &MatrixHandle, column: usize) -> Result<Self> {
        let size = source.size();
        validate_axis(&size, COLUMN)?;
        validate_indices(&[column], &size, COLUMN)?;
        Ok(Self {
            sources: vec![source.clone()],
            column,
            permutation: Memo::new(),
        })
    }

    /// Source row for each output row
    ///
    /// A permutation cached before the source changed its row count is
    /// discarded and rebuilt.
    pub fn permutation(&self) -> Result<Arc<Vec<usize>>> {
        let permutation = self.compute_permutation()?;
        if permutation.len() == self.source().row_count() {
            return Ok(permutation);
        }
        self.permutation.invalidate();
        self.compute_permutation()
    }

    /// Source row shown at `coordinate`, already checked against `size`
    fn source_row(&self, coordinate: &Coordinate, size: &Coordinate) -> Result<usize> {
        let permutation = self.permutation()?;
        permutation
            .get(coordinate[ROW])
            .copied()
            .ok_or_else(|| MatrixError::out_of_bounds(coordinate, size))
    }

    fn compute_permutation(&self) -> Result<Arc<Vec<usize>>> {
        self.permutation.get_or_try_init(|| {
            let keys = self.source().with_matrix(|matrix| {
                let rows = matrix.row_count();
                let mut key = Coordinate::zeros(matrix.dimension_count()).with_axis(COLUMN, self.column);
                (0..rows)
                    .map(|row| {
                        key[ROW] = row;
                        matrix.get_value(&key)
                    })
                    .collect::<Result<Vec<Value>>>()
            })?;

            let mut permutation: Vec<usize> = (0..keys.len()).collect();
            permutation.sort_by(|&a, &b| keys[a].compare(&keys[b]));
            trace!(rows = permutation.len(), column = self.column, "sort permutation computed");
            Ok(Arc::new(permutation))
        })
    }
}

impl Calculation for SortIndex {
    fn name(&self) -> &'static str {
        "sort_index"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn size(&self) -> Coordinate {
        Coordinate::from([self.source().row_count(), 1])
    }

    fn value_type(&self) -> ValueType {
        ValueType::Long
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        let size = self.size();
        validate_in_bounds(coordinate, &size)?;
        Ok(Value::Long(self.source_row(coordinate, &size)? as i64))
    }

    fn set_value(&self, _coordinate: &Coordinate, _value: Value) -> Result<()> {
        Err(MatrixError::Unsupported {
            operation: "write into a sort index",
        })
    }

    fn annotation(&self) -> Option<Annotation> {
        self.source().annotation().map(|a| a.collapse_all())
    }

    fn invalidate(&self) {
        self.permutation.invalidate();
    }
}

/// Source rows reordered ascending by one column
pub struct Sort {
    index: SortIndex,
}

impl Sort {
    pub fn new(source: &MatrixHandle, column: usize) -> Result<Self> {
        Ok(Self {
            index: SortIndex::new(source, column)?,
        })
    }

    fn source_coordinate(&self, coordinate: &Coordinate) -> Result<Coordinate> {
        let size = self.size();
        validate_in_bounds(coordinate, &size)?;
        Ok(coordinate.with_axis(ROW, self.index.source_row(coordinate, &size)?))
    }
}

impl Calculation for Sort {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn sources(&self) -> &[MatrixHandle] {
        self.index.sources()
    }

    fn storage_type(&self) -> StorageType {
        self.source().storage_type()
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.source().get_value(&self.source_coordinate(coordinate)?)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        self.source().get_f64(&self.source_coordinate(coordinate)?)
    }

    /// Writes land on the source row that the output row shows
    fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let target = self.source_coordinate(coordinate)?;
        self.source().set_value(&target, value)
    }

    fn annotation(&self) -> Option<Annotation> {
        let annotation = self.source().annotation()?;
        let permutation = self.index.permutation().ok()?;
        Some(annotation.select(ROW, &permutation))
    }

    fn invalidate(&self) {
        self.index.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::{calc, CalcMode};

    fn source() -> MatrixHandle {
        MatrixHandle::new(
            DenseMatrix::from_rows(vec![
                vec![3.0, 30.0],
                vec![1.0, 10.0],
                vec![3.0, 31.0],
                vec![f64::NAN, 0.0],
                vec![2.0, 20.0],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_index_is_stable_with_nan_last() {
        let index = SortIndex::new(&source(), 0).unwrap();
        assert_eq!(*index.permutation().unwrap(), vec![1, 4, 0, 2, 3]);

        let matrix = calc(CalcMode::New, SortIndex::new(&source(), 0).unwrap()).unwrap();
        assert_eq!(matrix.size(), Coordinate::from([5, 1]));
        assert_eq!(matrix.value_type(), ValueType::Long);
        assert_eq!(matrix.get_i64(&Coordinate::from([2, 0])).unwrap(), 0);
    }

    #[test]
    fn test_index_rejects_writes() {
        let index = SortIndex::new(&source(), 1).unwrap();
        assert_eq!(
            index.set_value(&Coordinate::from([0, 0]), Value::Long(1)),
            Err(MatrixError::Unsupported {
                operation: "write into a sort index"
            })
        );
    }

    #[test]
    fn test_column_out_of_range() {
        assert!(SortIndex::new(&source(), 2).is_err());
    }

    #[test]
    fn test_sort_reorders_rows() {
        let sorted = calc(CalcMode::New, Sort::new(&source(), 1).unwrap()).unwrap();
        let values = sorted.to_vec_f64().unwrap();
        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[0.0, 1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 3.0, 31.0]);
    }

    #[test]
    fn test_permutation_follows_row_count_change() {
        let source = MatrixHandle::new(DenseMatrix::from_rows(vec![vec![2.0], vec![1.0]]).unwrap());
        let index = SortIndex::new(&source, 0).unwrap();
        let sort = Sort::new(&source, 0).unwrap();
        assert_eq!(index.get_value(&Coordinate::from([1, 0])).unwrap(), Value::Long(0));
        assert_eq!(sort.get_f64(&Coordinate::from([0, 0])).unwrap(), 1.0);

        source.resize(&Coordinate::from([4, 1])).unwrap();
        source.set_f64(&Coordinate::from([3, 0]), -1.0).unwrap();

        assert_eq!(*index.permutation().unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(index.get_value(&Coordinate::from([3, 0])).unwrap(), Value::Long(0));
        assert_eq!(sort.get_f64(&Coordinate::from([0, 0])).unwrap(), -1.0);
        assert_eq!(sort.get_f64(&Coordinate::from([3, 0])).unwrap(), 2.0);
        assert!(matches!(
            sort.get_f64(&Coordinate::from([4, 0])),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_sort_writes_through_to_source_row() {
        let source = source();
        let sort = Sort::new(&source, 0).unwrap();
        sort.set_value(&Coordinate::from([0, 1]), Value::Double(-10.0)).unwrap();
        assert_eq!(source.get_f64(&Coordinate::from([1, 1])).unwrap(), -10.0);
    }
}
