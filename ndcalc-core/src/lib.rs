//! ndcalc core - coordinate, value and matrix contract definitions
//!
//! This crate provides the pieces every matrix implementation and every
//! external consumer agrees on: coordinates and sizes, value-type and
//! storage tags, the [`Value`] tagged union with its coercion rules,
//! labels, the error taxonomy and the [`Matrix`] read/write contract.
//! Storage and the calculation engine live in the `ndcalc` crate.

pub mod annotation;
pub mod coordinates;
pub mod error;
pub mod traits;
pub mod types;
pub mod validation;
pub mod value;

pub use annotation::Annotation;
pub use coordinates::{is_smaller_than, minus, plus, product, Coordinate, CoordinateIter};
pub use error::{ErrorCategory, MatrixError, Result};
pub use traits::*;
pub use types::constants::{COLUMN, ROW};
pub use types::{Dimension, StorageType, ValueType};
pub use validation::{parse_range, parse_selection, AxisSelection};
pub use value::{compare_f64, Value};
