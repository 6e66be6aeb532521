//! Calculations and their evaluation modes
//!
//! A [`Calculation`] describes a derived matrix in terms of one or more
//! source matrices: its size, its value type and how to compute one cell
//! on demand. The [`Engine`] turns a calculation into a matrix in one of
//! three [`CalcMode`]s:
//!
//! - `New` evaluates every cell into freshly allocated storage
//! - `Link` returns a live view that recomputes each read
//! - `Orig` evaluates every cell and writes the results over the source
//!
//! For any deterministic calculation all three modes observe the same
//! values at every coordinate.

use std::fmt;

use ndcalc_core::{Annotation, Coordinate, Result, StorageType, Value, ValueType};

use crate::handle::MatrixHandle;

mod convert;
mod engine;
mod entrywise;
mod extremum;
mod link;
mod mean;
mod memo;
mod reduction;
mod selection;
mod sort;
mod sum;
mod transpose;
mod variance;

pub use convert::Convert;
pub use engine::{calc, Engine};
pub use entrywise::{Binary, BinaryOp, Entrywise, UnaryOp};
pub use extremum::{Extremum, ExtremumKind};
pub use link::LinkedMatrix;
pub use mean::Mean;
pub use selection::Selection;
pub use sort::{Sort, SortIndex};
pub use sum::Sum;
pub use transpose::Transpose;
pub use variance::{Std, Variance};

/// How a calculation result is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalcMode {
    /// Evaluate into new storage
    New,
    /// Live view over the sources
    Link,
    /// Evaluate and overwrite the first source
    Orig,
}

impl fmt::Display for CalcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalcMode::New => "NEW",
            CalcMode::Link => "LINK",
            CalcMode::Orig => "ORIG",
        };
        f.write_str(name)
    }
}

/// A lazily evaluated derived matrix
///
/// Every calculation has at least one source. Cell reads must be safe to
/// call from several threads at once; per-calculation caches are computed
/// once and dropped again through [`Calculation::invalidate`].
pub trait Calculation: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Input matrices, never empty
    fn sources(&self) -> &[MatrixHandle];

    /// The primary source; ORIG writes into it
    fn source(&self) -> &MatrixHandle {
        &self.sources()[0]
    }

    /// Result size, queried again on every access
    fn size(&self) -> Coordinate {
        self.source().size()
    }

    fn value_type(&self) -> ValueType {
        self.source().value_type()
    }

    /// Storage used when the result is materialized with NEW
    fn storage_type(&self) -> StorageType {
        StorageType::Dense
    }

    /// Compute one cell
    fn get_value(&self, coordinate: &Coordinate) -> Result<Value>;

    fn get_f64(&self, coordinate: &Coordinate) -> Result<f64> {
        Ok(self.get_value(coordinate)?.to_f64())
    }

    /// Write through to the sources
    ///
    /// Calculations without a meaningful inverse ignore writes.
    fn set_value(&self, coordinate: &Coordinate, value: Value) -> Result<()> {
        let _ = (coordinate, value);
        Ok(())
    }

    /// Labels of the result, derived from the sources
    fn annotation(&self) -> Option<Annotation> {
        self.source().annotation()
    }

    /// Drop cached sub-results after a source changed
    fn invalidate(&self) {}
}
