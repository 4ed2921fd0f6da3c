use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::DataValue;

/// Data type of values
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, EnumAsInner)]
pub enum DataType {
    Utf8String(StringOptions),
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    JSON,
    /// A closed set of named variants, carried at runtime as their string name
    Enum(EnumOptions),
    Null,
}

impl DataType {
    pub fn rust_string() -> Self {
        Self::Utf8String(StringOptions::new(None))
    }

    pub fn enumeration(name: impl Into<String>, variants: Vec<&str>) -> Self {
        Self::Enum(EnumOptions::new(
            name,
            variants.into_iter().map(|v| v.to_string()).collect(),
        ))
    }

    /// Returns whether values of this type are whole numbers
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::UInt8
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
        )
    }
}

/// Options for the VARCHAR data type
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct StringOptions {
    /// Maximum length of the varchar data in bytes
    pub length: Option<u32>,
}

impl StringOptions {
    pub fn new(length: Option<u32>) -> Self {
        Self { length }
    }
}

/// Options for enumerated types
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct EnumOptions {
    /// The name of the enum type, used in diagnostics
    pub name: String,
    /// The permitted variants, in declaration order
    pub variants: Vec<String>,
}

impl EnumOptions {
    pub fn new(name: impl Into<String>, variants: Vec<String>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

// Provide conversion from DataValue into DataType
impl<'a> From<&'a DataValue> for DataType {
    fn from(v: &'a DataValue) -> Self {
        match v {
            DataValue::Null => DataType::Null,
            DataValue::Utf8String(_) => DataType::Utf8String(StringOptions::default()),
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::Int8(_) => DataType::Int8,
            DataValue::UInt8(_) => DataType::UInt8,
            DataValue::Int16(_) => DataType::Int16,
            DataValue::UInt16(_) => DataType::UInt16,
            DataValue::Int32(_) => DataType::Int32,
            DataValue::UInt32(_) => DataType::UInt32,
            DataValue::Int64(_) => DataType::Int64,
            DataValue::UInt64(_) => DataType::UInt64,
            DataValue::Float32(_) => DataType::Float32,
            DataValue::Float64(_) => DataType::Float64,
            DataValue::JSON(_) => DataType::JSON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_is_integer() {
        assert!(DataType::Int32.is_integer());
        assert!(DataType::UInt64.is_integer());
        assert!(!DataType::Float64.is_integer());
        assert!(!DataType::rust_string().is_integer());
        assert!(!DataType::enumeration("Kind", vec!["a"]).is_integer());
    }

    #[test]
    fn test_enum_options_contains() {
        let opts = EnumOptions::new("Kind", vec!["active".into(), "archived".into()]);

        assert!(opts.contains("active"));
        assert!(!opts.contains("deleted"));
    }

    #[test]
    fn test_data_type_from_value() {
        assert_eq!(DataType::from(&DataValue::Int64(1)), DataType::Int64);
        assert_eq!(DataType::from(&DataValue::Null), DataType::Null);
        assert_eq!(DataType::from(&DataValue::from("a")), DataType::rust_string());
    }
}
