//! Parsing utilities for selection strings
//!
//! A selection string picks indices per axis. Axes are separated by `;`,
//! items within an axis by `,`. An item is a single index, a half-open
//! range `start:end` or `start-end`, or `*` to keep the whole axis.
//!
//! ```text
//! "2,0;*"    rows 2 and 0, every column
//! "1:3;0"    rows 1 and 2, column 0
//! ```

use core::ops::Range;

use crate::{MatrixError, Result};

/// Per-axis index lists; `None` keeps the axis unchanged
pub type AxisSelection = Vec<Option<Vec<usize>>>;

/// Parse a range string in the format "start:end" or "start-end"
///
/// Both forms are half-open: `"1:3"` and `"1-3"` yield `1..3`.
pub fn parse_range(range_str: &str) -> Result<Range<usize>> {
    let invalid = || MatrixError::InvalidSelection(format!("invalid range {range_str:?}"));

    let (start_str, end_str) = range_str
        .split_once(':')
        .or_else(|| range_str.split_once('-'))
        .ok_or_else(invalid)?;

    let start = parse_usize(start_str).map_err(|_| invalid())?;
    let end = parse_usize(end_str).map_err(|_| invalid())?;

    if start > end {
        return Err(invalid());
    }

    Ok(start..end)
}

/// Parse a full selection string into per-axis index lists
pub fn parse_selection(selection: &str) -> Result<AxisSelection> {
    if selection.trim().is_empty() {
        return Err(MatrixError::InvalidSelection("empty selection".into()));
    }

    selection.split(';').map(parse_axis).collect()
}

fn parse_axis(axis: &str) -> Result<Option<Vec<usize>>> {
    let axis = axis.trim();
    if axis == "*" {
        return Ok(None);
    }
    if axis.is_empty() {
        return Err(MatrixError::InvalidSelection("empty axis selection".into()));
    }

    let mut indices = Vec::new();
    for item in axis.split(',').map(str::trim) {
        if item.contains(':') || item.contains('-') {
            indices.extend(parse_range(item)?);
        } else {
            indices.push(parse_usize(item)?);
        }
    }
    Ok(Some(indices))
}

/// Parse a usize from a string with error handling
fn parse_usize(s: &str) -> Result<usize> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MatrixError::InvalidSelection(format!("invalid index {s:?}")));
    }
    s.parse()
        .map_err(|_| MatrixError::InvalidSelection(format!("index {s:?} overflows")))
}
