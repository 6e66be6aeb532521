//! Tagged union over every cell type and the coercion helpers between them
//!
//! Typed accessors on a matrix never see another type's native
//! representation directly: reading an INT matrix as `f64` or writing a
//! string into a DOUBLE matrix goes through the conversions defined here.
//!
//! Conversion rules:
//! - numbers convert numerically, `f64 -> integer` saturates and maps NaN to 0
//! - booleans read as 1/0, chars as their code point
//! - dates read as milliseconds since the Unix epoch
//! - strings are parsed; unparseable strings read as NaN or fail for exact types
//! - `Null` reads as NaN, 0, `false` or the empty string

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::{MatrixError, Result, ValueType};

/// A single cell value of any [`ValueType`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Absent object, the default of OBJECT matrices
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Char(char),
    String(String),
    Date(DateTime<Utc>),
    ByteArray(Vec<u8>),
}

impl Value {
    /// Default cell value of a matrix with the given value type
    pub fn default_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Boolean => Value::Boolean(false),
            ValueType::Byte => Value::Byte(0),
            ValueType::Short => Value::Short(0),
            ValueType::Int => Value::Int(0),
            ValueType::Long => Value::Long(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Double => Value::Double(0.0),
            ValueType::BigInteger => Value::BigInteger(BigInt::zero()),
            ValueType::BigDecimal => Value::BigDecimal(BigDecimal::zero()),
            ValueType::Char => Value::Char('\0'),
            ValueType::String => Value::String(String::new()),
            ValueType::Date => Value::Date(epoch()),
            ValueType::ByteArray => Value::ByteArray(Vec::new()),
            ValueType::Object => Value::Null,
        }
    }

    /// The value type this value natively belongs to
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Object,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Byte(_) => ValueType::Byte,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::BigInteger(_) => ValueType::BigInteger,
            Value::BigDecimal(_) => ValueType::BigDecimal,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
            Value::Date(_) => ValueType::Date,
            Value::ByteArray(_) => ValueType::ByteArray,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading; NaN where no numeric reading exists
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Null => f64::NAN,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Byte(v) => *v as f64,
            Value::Short(v) => *v as f64,
            Value::Int(v) => *v as f64,
            Value::Long(v) => *v as f64,
            Value::Float(v) => *v as f64,
            Value::Double(v) => *v,
            Value::BigInteger(v) => v.to_f64().unwrap_or(f64::NAN),
            Value::BigDecimal(v) => v.to_f64().unwrap_or(f64::NAN),
            Value::Char(c) => *c as u32 as f64,
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Value::Date(d) => d.timestamp_millis() as f64,
            Value::ByteArray(_) => f64::NAN,
        }
    }

    /// Integer reading
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Value::Null => Ok(0),
            Value::Boolean(b) => Ok(i64::from(*b)),
            Value::Byte(v) => Ok(i64::from(*v)),
            Value::Short(v) => Ok(i64::from(*v)),
            Value::Int(v) => Ok(i64::from(*v)),
            Value::Long(v) => Ok(*v),
            Value::Float(v) => Ok(*v as i64),
            Value::Double(v) => Ok(*v as i64),
            Value::BigInteger(v) => v
                .to_i64()
                .ok_or_else(|| self.conversion_error(ValueType::Long)),
            Value::BigDecimal(v) => v
                .to_i64()
                .ok_or_else(|| self.conversion_error(ValueType::Long)),
            Value::Char(c) => Ok(i64::from(*c as u32)),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .filter(|v| !v.is_nan())
                            .map(|v| v as i64)
                    })
                    .ok_or_else(|| self.conversion_error(ValueType::Long))
            }
            Value::Date(d) => Ok(d.timestamp_millis()),
            Value::ByteArray(_) => Err(self.conversion_error(ValueType::Long)),
        }
    }

    /// Boolean reading; numbers are true when non-zero
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Null => Ok(false),
            Value::Boolean(b) => Ok(*b),
            Value::Byte(v) => Ok(*v != 0),
            Value::Short(v) => Ok(*v != 0),
            Value::Int(v) => Ok(*v != 0),
            Value::Long(v) => Ok(*v != 0),
            Value::Float(v) => Ok(*v != 0.0),
            Value::Double(v) => Ok(*v != 0.0),
            Value::BigInteger(v) => Ok(!v.is_zero()),
            Value::BigDecimal(v) => Ok(!v.is_zero()),
            Value::Char(c) => Ok(*c != '\0'),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("false") || trimmed.is_empty() {
                    Ok(false)
                } else {
                    trimmed
                        .parse::<f64>()
                        .map(|v| v != 0.0)
                        .map_err(|_| self.conversion_error(ValueType::Boolean))
                }
            }
            Value::Date(d) => Ok(d.timestamp_millis() != 0),
            Value::ByteArray(bytes) => Ok(!bytes.is_empty()),
        }
    }

    /// Arbitrary-precision integer reading
    pub fn to_big_integer(&self) -> Result<BigInt> {
        match self {
            Value::BigInteger(v) => Ok(v.clone()),
            Value::BigDecimal(v) => Ok(v.with_scale(0).into_bigint_and_exponent().0),
            Value::Float(_) | Value::Double(_) => BigInt::from_f64(self.to_f64().trunc())
                .ok_or_else(|| self.conversion_error(ValueType::BigInteger)),
            Value::String(s) => BigInt::from_str(s.trim())
                .or_else(|_| self.to_i64().map(BigInt::from))
                .map_err(|_| self.conversion_error(ValueType::BigInteger)),
            Value::ByteArray(bytes) => Ok(BigInt::from_signed_bytes_be(bytes)),
            _ => self.to_i64().map(BigInt::from),
        }
    }

    /// Arbitrary-precision decimal reading
    pub fn to_big_decimal(&self) -> Result<BigDecimal> {
        match self {
            Value::BigDecimal(v) => Ok(v.clone()),
            Value::BigInteger(v) => Ok(BigDecimal::new(v.clone(), 0)),
            Value::Float(v) => BigDecimal::from_f32(*v)
                .ok_or_else(|| self.conversion_error(ValueType::BigDecimal)),
            Value::Double(v) => BigDecimal::from_f64(*v)
                .ok_or_else(|| self.conversion_error(ValueType::BigDecimal)),
            Value::String(s) => BigDecimal::from_str(s.trim())
                .map_err(|_| self.conversion_error(ValueType::BigDecimal)),
            Value::ByteArray(_) => Err(self.conversion_error(ValueType::BigDecimal)),
            _ => self.to_i64().map(BigDecimal::from),
        }
    }

    /// Character reading; strings yield their first character
    pub fn to_char(&self) -> Result<char> {
        match self {
            Value::Null => Ok('\0'),
            Value::Char(c) => Ok(*c),
            Value::String(s) => Ok(s.chars().next().unwrap_or('\0')),
            _ => self
                .to_i64()
                .ok()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| self.conversion_error(ValueType::Char)),
        }
    }

    /// Date reading; numbers are milliseconds since the Unix epoch
    pub fn to_date(&self) -> Result<DateTime<Utc>> {
        match self {
            Value::Null => Ok(epoch()),
            Value::Date(d) => Ok(*d),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|d| d.with_timezone(&Utc))
                .or_else(|_| self.to_i64().and_then(|ms| self.date_from_millis(ms)))
                .map_err(|_| self.conversion_error(ValueType::Date)),
            Value::ByteArray(_) => Err(self.conversion_error(ValueType::Date)),
            _ => self.to_i64().and_then(|ms| self.date_from_millis(ms)),
        }
    }

    /// Byte-array reading; other values yield the UTF-8 bytes of their
    /// display form
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::ByteArray(bytes) => bytes.clone(),
            Value::BigInteger(v) => v.to_signed_bytes_be(),
            other => other.to_string().into_bytes(),
        }
    }

    /// Convert this value to the native representation of `target`
    pub fn coerce(&self, target: ValueType) -> Result<Value> {
        if self.value_type() == target && !self.is_null() {
            return Ok(self.clone());
        }
        let coerced = match target {
            ValueType::Boolean => Value::Boolean(self.to_bool()?),
            ValueType::Byte => Value::Byte(self.to_i64()?.clamp(i8::MIN.into(), i8::MAX.into()) as i8),
            ValueType::Short => {
                Value::Short(self.to_i64()?.clamp(i16::MIN.into(), i16::MAX.into()) as i16)
            }
            ValueType::Int => Value::Int(self.to_i64()?.clamp(i32::MIN.into(), i32::MAX.into()) as i32),
            ValueType::Long => Value::Long(self.to_i64()?),
            ValueType::Float => Value::Float(self.to_f64() as f32),
            ValueType::Double => Value::Double(self.to_f64()),
            ValueType::BigInteger => Value::BigInteger(self.to_big_integer()?),
            ValueType::BigDecimal => Value::BigDecimal(self.to_big_decimal()?),
            ValueType::Char => Value::Char(self.to_char()?),
            ValueType::String => Value::String(self.to_string()),
            ValueType::Date => Value::Date(self.to_date()?),
            ValueType::ByteArray => Value::ByteArray(self.to_bytes()),
            ValueType::Object => self.clone(),
        };
        Ok(coerced)
    }

    /// Total order used for sorting
    ///
    /// Values of the same exact type compare natively, numbers compare
    /// numerically, anything involving strings or byte arrays compares by
    /// display form. NaN and `Null` sort after everything else.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::ByteArray(a), Value::ByteArray(b)) => a.cmp(b),
            (Value::BigInteger(a), Value::BigInteger(b)) => a.cmp(b),
            (Value::BigDecimal(a), Value::BigDecimal(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::String(_) | Value::ByteArray(_), _)
            | (_, Value::String(_) | Value::ByteArray(_)) => {
                self.to_string().cmp(&other.to_string())
            }
            _ => compare_f64(self.to_f64(), other.to_f64()),
        }
    }

    fn conversion_error(&self, to: ValueType) -> MatrixError {
        MatrixError::conversion(self.value_type(), to, self)
    }

    fn date_from_millis(&self, millis: i64) -> Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| self.conversion_error(ValueType::Date))
    }
}

/// Ascending order on `f64` with NaN sorted last
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// The Unix epoch, default of DATE cells
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::BigInteger(v) => write!(f, "{v}"),
            Value::BigDecimal(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.to_rfc3339()),
            Value::ByteArray(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
