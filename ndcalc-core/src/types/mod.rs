//! Value-type, storage and reduction-dimension tags
//!
//! Every concrete matrix declares exactly one [`ValueType`] and one
//! [`StorageType`]. Reductions choose the collapsed axis with a
//! [`Dimension`].

pub mod constants;

use core::fmt;

use crate::{Coordinate, MatrixError, Result};
use constants::{COLUMN, ROW};

/// Primitive content type of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Char,
    String,
    Date,
    ByteArray,
    Object,
}

impl ValueType {
    /// Every value type, in declaration order
    pub const ALL: [ValueType; 14] = [
        ValueType::Boolean,
        ValueType::Byte,
        ValueType::Short,
        ValueType::Int,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::BigInteger,
        ValueType::BigDecimal,
        ValueType::Char,
        ValueType::String,
        ValueType::Date,
        ValueType::ByteArray,
        ValueType::Object,
    ];

    /// Whether cells of this type have a direct numeric reading
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Byte
                | ValueType::Short
                | ValueType::Int
                | ValueType::Long
                | ValueType::Float
                | ValueType::Double
                | ValueType::BigInteger
                | ValueType::BigDecimal
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Boolean => "BOOLEAN",
            ValueType::Byte => "BYTE",
            ValueType::Short => "SHORT",
            ValueType::Int => "INT",
            ValueType::Long => "LONG",
            ValueType::Float => "FLOAT",
            ValueType::Double => "DOUBLE",
            ValueType::BigInteger => "BIGINTEGER",
            ValueType::BigDecimal => "BIGDECIMAL",
            ValueType::Char => "CHAR",
            ValueType::String => "STRING",
            ValueType::Date => "DATE",
            ValueType::ByteArray => "BYTEARRAY",
            ValueType::Object => "OBJECT",
        };
        write!(f, "{name}")
    }
}

/// Storage discipline of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageType {
    /// Every in-bounds cell is materialized
    #[default]
    Dense,
    /// Only non-default cells are stored
    Sparse,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Dense => write!(f, "dense"),
            StorageType::Sparse => write!(f, "sparse"),
        }
    }
}

/// Axis collapsed by a reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    /// Collapse the row axis: `[r, c] -> [1, c]`
    Row,
    /// Collapse the column axis: `[r, c] -> [r, 1]`
    Column,
    /// Collapse every axis: `[r, c] -> [1, 1]`
    All,
    /// Collapse one axis of an N-dimensional matrix by index
    Axis(usize),
}

impl Dimension {
    /// The collapsed axis index, `None` for [`Dimension::All`]
    pub const fn axis(&self) -> Option<usize> {
        match self {
            Dimension::Row => Some(ROW),
            Dimension::Column => Some(COLUMN),
            Dimension::All => None,
            Dimension::Axis(axis) => Some(*axis),
        }
    }

    /// Size of the reduction of a matrix of size `size` along this dimension
    pub fn reduce(&self, size: &Coordinate) -> Result<Coordinate> {
        match self.axis() {
            Some(axis) if axis < size.dimension_count() => Ok(size.with_axis(axis, 1)),
            Some(axis) => Err(MatrixError::InvalidArgument(format!(
                "cannot reduce axis {axis} of a {}-dimensional matrix",
                size.dimension_count()
            ))),
            None => Ok(Coordinate::ones(size.dimension_count())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Row => write!(f, "ROW"),
            Dimension::Column => write!(f, "COLUMN"),
            Dimension::All => write!(f, "ALL"),
            Dimension::Axis(axis) => write!(f, "AXIS {axis}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_reduce_sizes() {
        let size = Coordinate::from([4, 3]);
        assert_eq!(Dimension::Row.reduce(&size).unwrap(), Coordinate::from([1, 3]));
        assert_eq!(Dimension::Column.reduce(&size).unwrap(), Coordinate::from([4, 1]));
        assert_eq!(Dimension::All.reduce(&size).unwrap(), Coordinate::from([1, 1]));
    }

    #[test]
    fn test_dimension_reduce_rejects_missing_axis() {
        let size = Coordinate::from([5]);
        assert!(Dimension::Column.reduce(&size).is_err());
        assert_eq!(Dimension::All.reduce(&size).unwrap(), Coordinate::from([1]));
    }

    #[test]
    fn test_axis_dimension_reduces_any_axis() {
        let size = Coordinate::from([2, 3, 4]);
        assert_eq!(Dimension::Axis(2).axis(), Some(2));
        assert_eq!(Dimension::Axis(2).reduce(&size).unwrap(), Coordinate::from([2, 3, 1]));
        assert_eq!(Dimension::Axis(0).reduce(&size).unwrap(), Dimension::Row.reduce(&size).unwrap());
        assert!(Dimension::Axis(3).reduce(&size).is_err());
        assert_eq!(Dimension::Axis(2).to_string(), "AXIS 2");
    }

    #[test]
    fn test_numeric_types() {
        assert!(ValueType::Double.is_numeric());
        assert!(ValueType::BigDecimal.is_numeric());
        assert!(!ValueType::String.is_numeric());
        assert!(!ValueType::Boolean.is_numeric());
        assert_eq!(ValueType::ALL.len(), 14);
    }
}
