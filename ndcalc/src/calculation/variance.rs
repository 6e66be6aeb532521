use ndcalc_core::{Annotation, Coordinate, Dimension, Result, Value, ValueType};

use super::reduction::{reduced_annotation, reduced_size, LineCache};
use super::Calculation;
use crate::handle::MatrixHandle;

/// Sample variance along a dimension
///
/// Uses the unbiased divisor `count - 1`, replaced by 1 for single-cell
/// lines. Line means and squared deviations are accumulated once, in two
/// passes over the source, and reused.
pub struct Variance {
    sources: Vec<MatrixHandle>,
    dimension: Dimension,
    lines: LineCache,
}

impl Variance {
    pub fn new(source: &MatrixHandle, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        dimension.reduce(&source.size())?;
        Ok(Self {
            sources: vec![source.clone()],
            dimension,
            lines: LineCache::new(dimension, ignore_nan).with_deviations(),
        })
    }
}

impl Calculation for Variance {
    fn name(&self) -> &'static str {
        "variance"
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
        Ok(self.lines.line(self.source(), coordinate)?.variance())
    }

    fn annotation(&self) -> Option<Annotation> {
        reduced_annotation(self.source(), self.dimension)
    }

    fn invalidate(&self) {
        self.lines.invalidate();
    }
}

/// Sample standard deviation along a dimension
pub struct Std {
    variance: Variance,
}

impl Std {
    pub fn new(source: &MatrixHandle, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        Ok(Self {
            variance: Variance::new(source, dimension, ignore_nan)?,
        })
    }
}

impl Calculation for Std {
    fn name(&self) -> &'static str {
        "std"
    }

    fn sources(&self) -> &[MatrixHandle] {
        self.variance.sources()
    }

    fn size(&self) -> Coordinate {
        self.variance.size()
    }

    fn value_type(&self) -> ValueType {
        ValueType::Double
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.get_f64(coordinate).map(Value::Double)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.variance.get_f64(coordinate)?.sqrt())
    }

    fn annotation(&self) -> Option<Annotation> {
        self.variance.annotation()
    }

    fn invalidate(&self) {
        self.variance.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;
    use crate::sparse::SparseMatrix;

    fn column(values: Vec<f64>) -> MatrixHandle {
        let rows = values.into_iter().map(|v| vec![v]).collect();
        MatrixHandle::new(DenseMatrix::from_rows(rows).unwrap())
    }

    fn origin() -> Coordinate {
        Coordinate::from([0, 0])
    }

    #[test]
    fn test_sample_variance() {
        let source = column(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let variance = Variance::new(&source, Dimension::Row, false).unwrap();
        let expected = 32.0 / 7.0;
        assert!((variance.get_f64(&origin()).unwrap() - expected).abs() < 1e-12);

        let std = Std::new(&source, Dimension::Row, false).unwrap();
        assert!((std.get_f64(&origin()).unwrap() - expected.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_cell_divisor() {
        let source = column(vec![3.0]);
        let variance = Variance::new(&source, Dimension::Row, false).unwrap();
        assert_eq!(variance.get_f64(&origin()).unwrap(), 0.0);
    }

    #[test]
    fn test_nan_cells_skipped() {
        let source = column(vec![1.0, f64::NAN, 3.0]);
        let variance = Variance::new(&source, Dimension::Row, true).unwrap();
        assert_eq!(variance.get_f64(&origin()).unwrap(), 2.0);

        let all_nan = column(vec![f64::NAN]);
        let variance = Variance::new(&all_nan, Dimension::Row, true).unwrap();
        assert!(variance.get_f64(&origin()).unwrap().is_nan());
    }

    #[test]
    fn test_sparse_absent_cells_count_as_zero() {
        let mut sparse = SparseMatrix::<f64>::new([3, 1]);
        sparse.set(&Coordinate::from([0, 0]), 3.0).unwrap();
        let source = MatrixHandle::new(sparse);

        let dense = column(vec![3.0, 0.0, 0.0]);
        let expected = Variance::new(&dense, Dimension::Row, false)
            .unwrap()
            .get_f64(&origin())
            .unwrap();
        let actual = Variance::new(&source, Dimension::Row, false)
            .unwrap()
            .get_f64(&origin())
            .unwrap();
        assert!((actual - expected).abs() < 1e-12);
    }
}
