use std::fmt;

use ndcalc_core::{Annotation, Coordinate, Dimension, Result, Value, ValueType};

use super::reduction::{reduced_annotation, reduced_size, Line, LineCache};
use super::Calculation;
use crate::handle::MatrixHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtremumKind {
    Min,
    Max,
}

impl ExtremumKind {
    fn pick(self, line: &Line) -> f64 {
        match self {
            ExtremumKind::Min => line.min,
            ExtremumKind::Max => line.max,
        }
    }
}

impl fmt::Display for ExtremumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremumKind::Min => write!(f, "min"),
            ExtremumKind::Max => write!(f, "max"),
        }
    }
}

/// Minimum or maximum along a dimension
///
/// NaN cells never win; a line without any other value yields NaN.
pub struct Extremum {
    sources: Vec<MatrixHandle>,
    dimension: Dimension,
    kind: ExtremumKind,
    lines: LineCache,
}

impl Extremum {
    pub fn new(source: &MatrixHandle, dimension: Dimension, kind: ExtremumKind) -> Result<Self> {
        dimension.reduce(&source.size())?;
        Ok(Self {
            sources: vec![source.clone()],
            dimension,
            kind,
            lines: LineCache::new(dimension, false),
        })
    }

    pub fn min(source: &MatrixHandle, dimension: Dimension) -> Result<Self> {
        Self::new(source, dimension, ExtremumKind::Min)
    }

    pub fn max(source: &MatrixHandle, dimension: Dimension) -> Result<Self> {
        Self::new(source, dimension, ExtremumKind::Max)
    }
}

impl Calculation for Extremum {
    fn name(&self) -> &'static str {
        match self.kind {
            ExtremumKind::Min => "min",
            ExtremumKind::Max => "max",
        }
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
        let line = self.lines.line(self.source(), coordinate)?;
        Ok(self.kind.pick(&line))
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

    #[test]
    fn test_min_max_per_axis() {
        let source = MatrixHandle::new(
            DenseMatrix::from_rows(vec![vec![3.0, -1.0], vec![f64::NAN, 7.0]]).unwrap(),
        );

        let min = calc(CalcMode::New, Extremum::min(&source, Dimension::Row).unwrap()).unwrap();
        assert_eq!(min.to_vec_f64().unwrap(), vec![3.0, -1.0]);

        let max =
            calc(CalcMode::New, Extremum::max(&source, Dimension::Column).unwrap()).unwrap();
        assert_eq!(max.to_vec_f64().unwrap(), vec![3.0, 7.0]);

        let all = Extremum::max(&source, Dimension::All).unwrap();
        assert_eq!(all.get_f64(&Coordinate::from([0, 0])).unwrap(), 7.0);
    }

    #[test]
    fn test_all_nan_line() {
        let source =
            MatrixHandle::new(DenseMatrix::from_rows(vec![vec![f64::NAN, f64::NAN]]).unwrap());
        let min = Extremum::min(&source, Dimension::Column).unwrap();
        assert!(min.get_f64(&Coordinate::from([0, 0])).unwrap().is_nan());
    }

    #[test]
    fn test_sparse_implicit_zero_participates() {
        let mut sparse = SparseMatrix::<f64>::new([3, 1]);
        sparse.set(&Coordinate::from([1, 0]), 4.0).unwrap();
        let source = MatrixHandle::new(sparse);

        let min = Extremum::min(&source, Dimension::Row).unwrap();
        assert_eq!(min.get_f64(&Coordinate::from([0, 0])).unwrap(), 0.0);
        let max = Extremum::max(&source, Dimension::Row).unwrap();
        assert_eq!(max.get_f64(&Coordinate::from([0, 0])).unwrap(), 4.0);
    }
}
