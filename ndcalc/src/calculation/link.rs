//! Live views over a calculation
//!
//! A [`LinkedMatrix`] satisfies the full [`Matrix`] contract without owning
//! cells: size, value type and every read are forwarded to the calculation
//! at access time, so the view tracks its sources as they change. Writes
//! go through the calculation to the source matrices.

use std::fmt;
use std::sync::Arc;

use ndcalc_core::{Annotation, Coordinate, Matrix, Result, StorageType, Value, ValueType};

use super::Calculation;

pub struct LinkedMatrix {
    calculation: Arc<dyn Calculation>,
    annotation: Option<Annotation>,
}

impl LinkedMatrix {
    pub(crate) fn new(calculation: Arc<dyn Calculation>) -> Self {
        let annotation = calculation.annotation();
        Self {
            calculation,
            annotation,
        }
    }

    pub fn calculation(&self) -> &Arc<dyn Calculation> {
        &self.calculation
    }

    /// Write through the calculation without exclusive access to the view
    pub fn set(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        self.calculation.set_value(coordinate, value)
    }
}

impl Matrix for LinkedMatrix {
    fn size(&self) -> Coordinate {
        self.calculation.size()
    }

    fn value_type(&self) -> ValueType {
        self.calculation.value_type()
    }

    /// Views report the storage of the matrix they would materialize into
    fn storage_type(&self) -> StorageType {
        self.calculation.storage_type()
    }

    fn get_value(&self, coordinate: &Coordinate) -> Result<Value> {
        self.calculation.get_value(coordinate)
    }

    fn set_value(&mut self, coordinate: &Coordinate, value: Value) -> Result<()> {
        self.set(coordinate, value)
    }

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        self.calculation.get_f64(coordinate)
    }

    fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }
}

impl fmt::Debug for LinkedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedMatrix")
            .field("calculation", &self.calculation.name())
            .field("size", &self.calculation.size())
            .finish()
    }
}
