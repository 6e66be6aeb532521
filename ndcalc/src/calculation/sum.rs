use ndcalc_core::{Annotation, Coordinate, Dimension, Result, Value, ValueType};

use super::reduction::{reduced_annotation, reduced_size, LineCache};
use super::Calculation;
use crate::handle::MatrixHandle;

/// Sum along a dimension
///
/// With `ignore_nan` set, non-finite cells are skipped; otherwise they
/// propagate into the result. All line sums are accumulated in one pass
/// on first read.
pub struct Sum {
    sources: Vec<MatrixHandle>,
    dimension: Dimension,
    lines: LineCache,
}

impl Sum {
    pub fn new(source: &MatrixHandle, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        dimension.reduce(&source.size())?;
        Ok(Self {
            sources: vec![source.clone()],
            dimension,
            lines: LineCache::new(dimension, ignore_nan),
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }
}

impl Calculation for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn size(&self) -> Coordinate {
        reduced_size(self.source(), self.dimension)
    }

    fn value_type(&self) -> ValueType {
        ValueType::Double
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.get_f64(coordinate).map(Value::Double)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.lines.line(self.source(), coordinate)?.sum)
    }

    fn annotation(&self) -> Option<Annotation> {
        reduced_annotation(self.source(), self.dimension)
    }

    fn invalidate(&self) {
        self.lines.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::sparse::SparseMatrix;
    use crate::{calc, CalcMode};

    fn source() -> MatrixHandle {
        MatrixHandle::new(
            DenseMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap(),
        )
    }

    #[test]
    fn test_sum_sizes_and_values() {
        let source = source();

        let rows = calc(CalcMode::New, Sum::new(&source, Dimension::Row, false).unwrap()).unwrap();
        assert_eq!(rows.size(), Coordinate::from([1, 3]));
        assert_eq!(rows.to_vec_f64().unwrap(), vec![5.0, 7.0, 9.0]);

        let columns =
            calc(CalcMode::New, Sum::new(&source, Dimension::Column, false).unwrap()).unwrap();
        assert_eq!(columns.size(), Coordinate::from([2, 1]));
        assert_eq!(columns.to_vec_f64().unwrap(), vec![6.0, 15.0]);

        let all = calc(CalcMode::New, Sum::new(&source, Dimension::All, false).unwrap()).unwrap();
        assert_eq!(all.size(), Coordinate::from([1, 1]));
        assert_eq!(all.to_vec_f64().unwrap(), vec![21.0]);
    }

    #[test]
    fn test_nan_handling() {
        let source = MatrixHandle::new(
            DenseMatrix::from_rows(vec![vec![1.0], vec![f64::NAN], vec![3.0]]).unwrap(),
        );
        let skipping = Sum::new(&source, Dimension::Row, true).unwrap();
        assert_eq!(skipping.get_f64(&Coordinate::from([0, 0])).unwrap(), 4.0);

        let propagating = Sum::new(&source, Dimension::Row, false).unwrap();
        assert!(propagating.get_f64(&Coordinate::from([0, 0])).unwrap().is_nan());
    }

    #[test]
    fn test_sparse_source() {
        let mut sparse = SparseMatrix::<f64>::new([1000, 1000]);
        sparse.set(&Coordinate::from([10, 3]), 2.0).unwrap();
        sparse.set(&Coordinate::from([999, 3]), 5.0).unwrap();
        let source = MatrixHandle::new(sparse);

        let sum = Sum::new(&source, Dimension::Row, false).unwrap();
        assert_eq!(sum.get_f64(&Coordinate::from([0, 3])).unwrap(), 7.0);
        assert_eq!(sum.get_f64(&Coordinate::from([0, 4])).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_axis_rejected() {
        let vector = MatrixHandle::new(DenseMatrix::<f64>::new([4]));
        assert!(Sum::new(&vector, Dimension::Column, false).is_err());
    }

    #[test]
    fn test_out_of_range_read() {
        let sum = Sum::new(&source(), Dimension::Row, false).unwrap();
        assert!(sum.get_f64(&Coordinate::from([1, 0])).is_err());
    }
}
