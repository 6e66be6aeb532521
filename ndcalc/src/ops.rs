//! Method-style access to the built-in calculations
//!
//! Each method builds the calculation over `self` and materializes it with
//! a default [`Engine`](crate::Engine). Use the calculation types with an
//! explicit engine to control storage and parallelism.

use ndcalc_core::{AxisSelection, Dimension, Result, ValueType};

use crate::calculation::{
    calc, Binary, BinaryOp, CalcMode, Convert, Entrywise, Extremum, Mean, Selection, Sort,
    SortIndex, Std, Sum, Transpose, UnaryOp, Variance,
};
use crate::handle::MatrixHandle;

impl MatrixHandle {
    pub fn sum(&self, mode: CalcMode, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        calc(mode, Sum::new(self, dimension, ignore_nan)?)
    }

    pub fn mean(&self, mode: CalcMode, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        calc(mode, Mean::new(self, dimension, ignore_nan)?)
    }

    pub fn variance(&self, mode: CalcMode, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        calc(mode, Variance::new(self, dimension, ignore_nan)?)
    }

    pub fn std(&self, mode: CalcMode, dimension: Dimension, ignore_nan: bool) -> Result<Self> {
        calc(mode, Std::new(self, dimension, ignore_nan)?)
    }

    pub fn min(&self, mode: CalcMode, dimension: Dimension) -> Result<Self> {
        calc(mode, Extremum::min(self, dimension)?)
    }

    pub fn max(&self, mode: CalcMode, dimension: Dimension) -> Result<Self> {
        calc(mode, Extremum::max(self, dimension)?)
    }

    /// Source row index of each row after sorting by `column`
    pub fn sort_index(&self, mode: CalcMode, column: usize) -> Result<Self> {
        calc(mode, SortIndex::new(self, column)?)
    }

    pub fn sort(&self, mode: CalcMode, column: usize) -> Result<Self> {
        calc(mode, Sort::new(self, column)?)
    }

    pub fn select(&self, mode: CalcMode, axes: AxisSelection) -> Result<Self> {
        calc(mode, Selection::new(self, axes)?)
    }

    /// Select with a selection string such as `"2,0;*"`
    pub fn select_str(&self, mode: CalcMode, selection: &str) -> Result<Self> {
        calc(mode, Selection::parse(self, selection)?)
    }

    pub fn delete(&self, mode: CalcMode, deleted: AxisSelection) -> Result<Self> {
        calc(mode, Selection::deletion(self, deleted)?)
    }

    pub fn transpose(&self, mode: CalcMode) -> Result<Self> {
        calc(mode, Transpose::new(self)?)
    }

    pub fn convert(&self, mode: CalcMode, target: ValueType) -> Result<Self> {
        calc(mode, Convert::new(self, target))
    }

    /// Independent copy with the same type and storage
    pub fn copy(&self) -> Result<Self> {
        calc(CalcMode::New, Convert::copy(self))
    }

    pub fn apply(&self, mode: CalcMode, op: UnaryOp) -> Result<Self> {
        calc(mode, Entrywise::new(self, op))
    }

    pub fn combine_scalar(&self, mode: CalcMode, op: BinaryOp, scalar: f64) -> Result<Self> {
        calc(mode, Binary::scalar(self, op, scalar))
    }

    pub fn combine(&self, mode: CalcMode, op: BinaryOp, other: &MatrixHandle) -> Result<Self> {
        calc(mode, Binary::matrices(self, op, other)?)
    }
}
