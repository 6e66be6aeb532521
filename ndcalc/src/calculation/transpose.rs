use ndcalc_core::validation::{validate_axis, validate_in_bounds};
use ndcalc_core::{Annotation, Coordinate, Result, StorageType, Value, COLUMN, ROW};

use super::Calculation;
use crate::handle::MatrixHandle;

/// Swap two axes; rows and columns by default
#[derive(Debug, Clone)]
pub struct Transpose {
    sources: Vec<MatrixHandle>,
    axes: (usize, usize),
}

impl Transpose {
    pub fn new(source: &MatrixHandle) -> Result<Self> {
        Self::axes(source, ROW, COLUMN)
    }

    pub fn axes(source: &MatrixHandle, axis_a: usize, axis_b: usize) -> Result<Self> {
        let size = source.size();
        validate_axis(&size, axis_a)?;
        validate_axis(&size, axis_b)?;
        Ok(Self {
            sources: vec![source.clone()],
            axes: (axis_a, axis_b),
        })
    }

    fn source_coordinate(&self, coordinate: &Coordinate) -> Result<Coordinate> {
        validate_in_bounds(coordinate, &self.size())?;
        Ok(coordinate.transpose(self.axes.0, self.axes.1))
    }
}

impl Calculation for Transpose {
    fn name(&self) -> &'static str {
        "transpose"
    }

    fn sources(&self) -> &[MatrixHandle] {
        &self.sources
    }

    fn size(&self) -> Coordinate {
        self.source().size().transpose(self.axes.0, self.axes.1)
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

    fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let target = self.source_coordinate(coordinate)?;
        self.source().set_value(&target, value)
    }

    fn annotation(&self) -> Option<Annotation> {
        Some(self.source().annotation()?.transpose(self.axes.0, self.axes.1))
    }
}
