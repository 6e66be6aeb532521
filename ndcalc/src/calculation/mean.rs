use ndcalc_core::{Annotation, Coordinate, Dimension, Result, Value, ValueType};

use super::reduction::{reduced_annotation, reduced_size, LineCache};
use super::Calculation;
use crate::handle::MatrixHandle;

/// Arithmetic mean along a dimension
///
/// The per-line sums and counts are accumulated once on first read and
/// reused for every cell. With `ignore_nan` set, non-finite cells are
/// excluded from both the sum and the count; a line with nothing left to
/// average is NaN.
pub struct Mean {
    sources: Vec<MatrixHandle>,
    dimension: Dimension,
    lines: LineCache,
}

impl Mean {
    pub fn new(source: &MatrixHandle, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        dimension.reduce(&source.size())?;
        Ok(Self {
            sources: vec![source.clone()],
            dimension,
            lines: LineCache::new(dimension, ignore_nan),
        })
    }

    /// Number of cells contributing to result cell `coordinate`
    pub fn count(&self, coordinate: &Coordinate) -> Result<usize> {
        Ok(self.lines.line(self.source(), coordinate)?.count)
    }
}

impl Calculation for Mean {
    fn name(&self) -> &'static str {
        "mean"
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
        Ok(self.lines.line(self.source(), coordinate)?.mean())
    }

    fn annotation(&self) -> Option<Annotation> {
        reduced_annotation(self.source(), self.dimension)
    }

    fn invalidate(&self) {
        self.lines.invalidate();
    }
}
