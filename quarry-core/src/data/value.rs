use std::fmt;

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::DataType;

/// Data container for respective types
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, EnumAsInner)]
pub enum DataValue {
    Null,
    Utf8String(String),
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    JSON(String),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        *self == DataValue::Null
    }

    pub fn r#type(&self) -> DataType {
        DataType::from(self)
    }

    /// Returns the value as a wide integer if it holds a whole number
    pub fn as_integer(&self) -> Option<i128> {
        Some(match self {
            DataValue::Int8(v) => *v as i128,
            DataValue::UInt8(v) => *v as i128,
            DataValue::Int16(v) => *v as i128,
            DataValue::UInt16(v) => *v as i128,
            DataValue::Int32(v) => *v as i128,
            DataValue::UInt32(v) => *v as i128,
            DataValue::Int64(v) => *v as i128,
            DataValue::UInt64(v) => *v as i128,
            _ => return None,
        })
    }

    /// Compares two values, treating all integer widths as the same number line
    pub fn loosely_eq(&self, other: &DataValue) -> bool {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Utf8String(v) => write!(f, "{}", v),
            DataValue::Boolean(v) => write!(f, "{}", v),
            DataValue::Int8(v) => write!(f, "{}", v),
            DataValue::UInt8(v) => write!(f, "{}", v),
            DataValue::Int16(v) => write!(f, "{}", v),
            DataValue::UInt16(v) => write!(f, "{}", v),
            DataValue::Int32(v) => write!(f, "{}", v),
            DataValue::UInt32(v) => write!(f, "{}", v),
            DataValue::Int64(v) => write!(f, "{}", v),
            DataValue::UInt64(v) => write!(f, "{}", v),
            DataValue::Float32(v) => write!(f, "{}", v),
            DataValue::Float64(v) => write!(f, "{}", v),
            DataValue::JSON(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for DataValue {
    fn from(str: &str) -> Self {
        DataValue::Utf8String(str.to_string())
    }
}

impl From<String> for DataValue {
    fn from(str: String) -> Self {
        DataValue::Utf8String(str)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Boolean(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int32(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int64(v)
    }
}

impl From<u32> for DataValue {
    fn from(v: u32) -> Self {
        DataValue::UInt32(v)
    }
}

impl From<u64> for DataValue {
    fn from(v: u64) -> Self {
        DataValue::UInt64(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float64(v)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(DataValue::Null)
    }
}
