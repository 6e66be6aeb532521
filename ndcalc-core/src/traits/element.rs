//! Cell element types
//!
//! This module defines the trait that constrains what Rust types can back
//! a typed matrix, and its implementation for every [`ValueType`].

use core::fmt::Debug;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::{MatrixError, Result, Value, ValueType};

/// Trait for types that can be stored as matrix cells
///
/// Every element type maps onto exactly one [`ValueType`] and converts to
/// and from the untyped [`Value`] through the coercion helpers.
pub trait Element: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The value type tag this element type implements
    fn value_type() -> ValueType;

    /// The default (zero, false, empty) value
    fn default_value() -> Self;

    /// Whether `self` equals the default; sparse storage drops such cells
    fn is_default(&self) -> bool {
        *self == Self::default_value()
    }

    /// Coerce an untyped value into this element type
    fn from_value(value: &Value) -> Result<Self>;

    /// Wrap this element as an untyped value
    fn into_value(self) -> Value;

    /// Numeric reading used by reductions
    fn to_f64(&self) -> f64;

    /// Construct from a numeric result
    fn from_f64(value: f64) -> Result<Self>;

    /// Reinterpret a cell buffer as doubles, only for DOUBLE elements
    fn as_f64_slice(values: &[Self]) -> Option<&[f64]> {
        let _ = values;
        None
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }

            fn default_value() -> Self {
                0
            }

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Ok(other.to_i64()?.clamp(<$ty>::MIN.into(), <$ty>::MAX.into()) as $ty),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn to_f64(&self) -> f64 {
                *self as f64
            }

            fn from_f64(value: f64) -> Result<Self> {
                Ok(value as $ty)
            }
        }
    };
}

impl_integer_element!(i8, Byte);
impl_integer_element!(i16, Short);
impl_integer_element!(i32, Int);
impl_integer_element!(i64, Long);

impl Element for f64 {
    fn value_type() -> ValueType {
        ValueType::Double
    }

    fn default_value() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_f64())
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(value)
    }

    fn as_f64_slice(values: &[Self]) -> Option<&[f64]> {
        Some(values)
    }
}

impl Element for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn default_value() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_f64() as f32)
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn to_f64(&self) -> f64 {
        *self as f64
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(value as f32)
    }
}

impl Element for bool {
    fn value_type() -> ValueType {
        ValueType::Boolean
    }

    fn default_value() -> Self {
        false
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.to_bool()
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn to_f64(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(value != 0.0)
    }
}

impl Element for char {
    fn value_type() -> ValueType {
        ValueType::Char
    }

    fn default_value() -> Self {
        '\0'
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.to_char()
    }

    fn into_value(self) -> Value {
        Value::Char(self)
    }

    fn to_f64(&self) -> f64 {
        *self as u32 as f64
    }

    fn from_f64(value: f64) -> Result<Self> {
        Value::Double(value).to_char()
    }
}

impl Element for BigInt {
    fn value_type() -> ValueType {
        ValueType::BigInteger
    }

    fn default_value() -> Self {
        BigInt::zero()
    }

    fn is_default(&self) -> bool {
        self.is_zero()
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.to_big_integer()
    }

    fn into_value(self) -> Value {
        Value::BigInteger(self)
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn from_f64(value: f64) -> Result<Self> {
        <BigInt as FromPrimitive>::from_f64(value.trunc())
            .ok_or_else(|| MatrixError::conversion(ValueType::Double, ValueType::BigInteger, value))
    }
}

impl Element for BigDecimal {
    fn value_type() -> ValueType {
        ValueType::BigDecimal
    }

    fn default_value() -> Self {
        BigDecimal::zero()
    }

    fn is_default(&self) -> bool {
        self.is_zero()
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.to_big_decimal()
    }

    fn into_value(self) -> Value {
        Value::BigDecimal(self)
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn from_f64(value: f64) -> Result<Self> {
        <BigDecimal as FromPrimitive>::from_f64(value)
            .ok_or_else(|| MatrixError::conversion(ValueType::Double, ValueType::BigDecimal, value))
    }
}

impl Element for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn default_value() -> Self {
        String::new()
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_string())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn to_f64(&self) -> f64 {
        self.trim().parse().unwrap_or(f64::NAN)
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(value.to_string())
    }
}

impl Element for DateTime<Utc> {
    fn value_type() -> ValueType {
        ValueType::Date
    }

    fn default_value() -> Self {
        crate::value::epoch()
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.to_date()
    }

    fn into_value(self) -> Value {
        Value::Date(self)
    }

    fn to_f64(&self) -> f64 {
        self.timestamp_millis() as f64
    }

    fn from_f64(value: f64) -> Result<Self> {
        Value::Double(value).to_date()
    }
}

impl Element for Vec<u8> {
    fn value_type() -> ValueType {
        ValueType::ByteArray
    }

    fn default_value() -> Self {
        Vec::new()
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.to_bytes())
    }

    fn into_value(self) -> Value {
        Value::ByteArray(self)
    }

    fn to_f64(&self) -> f64 {
        f64::NAN
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(Value::Double(value).to_bytes())
    }
}

/// Generic OBJECT cells hold any value
impl Element for Value {
    fn value_type() -> ValueType {
        ValueType::Object
    }

    fn default_value() -> Self {
        Value::Null
    }

    fn is_default(&self) -> bool {
        self.is_null()
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }

    fn to_f64(&self) -> f64 {
        Value::to_f64(self)
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(Value::Double(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Element>(value: T) {
        let back = T::from_value(&value.clone().into_value()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_round_trip_every_element_type() {
        round_trip(true);
        round_trip(-5i8);
        round_trip(300i16);
        round_trip(-70_000i32);
        round_trip(1i64 << 40);
        round_trip(1.5f32);
        round_trip(-2.25f64);
        round_trip(BigInt::from(1u64 << 63) * BigInt::from(3));
        round_trip(BigDecimal::from(17) / BigDecimal::from(4));
        round_trip('λ');
        round_trip(String::from("cell"));
        round_trip(crate::value::epoch());
        round_trip(vec![1u8, 2, 3]);
        round_trip(Value::from("anything"));
    }

    #[test]
    fn test_integer_from_value_saturates() {
        assert_eq!(i8::from_value(&Value::Long(500)).unwrap(), i8::MAX);
        assert_eq!(i16::from_value(&Value::Double(-1e9)).unwrap(), i16::MIN);
    }

    #[test]
    fn test_defaults_are_default() {
        assert!(0.0f64.is_default());
        assert!(String::new().is_default());
        assert!(BigInt::zero().is_default());
        assert!(Value::Null.is_default());
        assert!(!1i32.is_default());
        assert_eq!(<f64 as Element>::value_type(), ValueType::Double);
    }

    #[test]
    fn test_big_numbers_from_f64() {
        assert_eq!(<BigInt as Element>::from_f64(2.7).unwrap(), BigInt::from(2));
        assert_eq!(<BigInt as Element>::from_f64(-2.7).unwrap(), BigInt::from(-2));
        assert!(<BigInt as Element>::from_f64(f64::NEG_INFINITY).is_err());
        assert_eq!(
            <BigDecimal as Element>::from_f64(0.5).unwrap(),
            BigDecimal::from(1) / BigDecimal::from(2)
        );
    }

    #[test]
    fn test_only_doubles_expose_a_slice() {
        assert_eq!(f64::as_f64_slice(&[1.0, 2.0]), Some(&[1.0, 2.0][..]));
        assert_eq!(f32::as_f64_slice(&[1.0, 2.0]), None);
        assert_eq!(i64::as_f64_slice(&[1]), None);
    }
}
