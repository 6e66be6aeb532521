//! ndcalc - N-dimensional matrices with lazily evaluated calculations
//!
//! This library provides dense and sparse N-dimensional matrices over a
//! fixed set of value types, and a calculation engine that evaluates
//! derived matrices (reductions, sorting, selection, conversion,
//! arithmetic) in one of three modes.
//!
//! ## Architecture
//!
//! - **ndcalc-core**: coordinates, value types, coercion, labels, errors
//!   and the [`Matrix`] contract (no storage)
//! - **ndcalc**: dense and sparse storage, shared handles with change
//!   notification, the backend registry and the calculation engine
//!
//! ## Quick Start
//!
//! ```rust
//! use ndcalc::{CalcMode, Coordinate, DenseMatrix, Dimension, MatrixHandle};
//!
//! fn example() -> ndcalc::Result<()> {
//!     let prices = MatrixHandle::new(DenseMatrix::from_rows(vec![
//!         vec![1.0, 2.0],
//!         vec![f64::NAN, 4.0],
//!         vec![3.0, 6.0],
//!     ])?);
//!
//!     // fresh storage
//!     let means = prices.mean(CalcMode::New, Dimension::Row, true)?;
//!     assert_eq!(means.to_vec_f64()?, vec![2.0, 4.0]);
//!
//!     // live view: follows later writes to the source
//!     let sums = prices.sum(CalcMode::Link, Dimension::Row, true)?;
//!     prices.set_f64(&Coordinate::from([1, 0]), 5.0)?;
//!     assert_eq!(sums.get_f64(&Coordinate::from([0, 0]))?, 9.0);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Modes
//!
//! - **NEW**: evaluate every cell into storage chosen by the registry
//! - **LINK**: return a view that recomputes on every read and forwards
//!   writes to its sources
//! - **ORIG**: evaluate every cell, then overwrite the source in place;
//!   only valid when the result has the source's size

pub use ndcalc_core::{
    compare_f64, parse_range, parse_selection, Annotation, AxisSelection, ChangeEvent, Coordinate,
    CoordinateIter, Dimension, Element, ErrorCategory, Matrix, MatrixError, MatrixListener,
    Result, StorageBackend, StorageType, Value, ValueType, COLUMN, ROW,
};

pub mod calculation;
pub mod config;
pub mod dense;
pub mod handle;
mod ops;
pub mod registry;
pub mod sparse;

pub use calculation::{
    calc, Binary, BinaryOp, CalcMode, Calculation, Convert, Engine, Entrywise, Extremum,
    ExtremumKind, LinkedMatrix, Mean, Selection, Sort, SortIndex, Std, Sum, Transpose, UnaryOp,
    Variance,
};
pub use config::MatrixConfig;
pub use dense::{DenseDoubleMatrix, DenseLongMatrix, DenseMatrix, DenseObjectMatrix};
pub use handle::MatrixHandle;
pub use registry::{BackendRegistry, MatrixBackend};
pub use sparse::{EvictionPolicy, SparseDoubleMatrix, SparseMatrix, SparseObjectMatrix};
