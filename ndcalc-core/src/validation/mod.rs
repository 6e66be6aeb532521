//! Validation utilities
//!
//! Pure functions over coordinates and selection strings; no storage
//! access.

pub mod bounds;
pub mod parsing;

pub use bounds::{
    validate_axis, validate_in_bounds, validate_indices, validate_same_dimensions,
    validate_same_size,
};
pub use parsing::{parse_range, parse_selection, AxisSelection};
