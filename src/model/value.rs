//! Typed attribute values and their validity flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute datatypes of the ODS `datatype_enum`, as spelled in the base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Any sequence type; used for the `values` of a local column.
    #[serde(rename = "DT_UNKNOWN")]
    Unknown,
    #[serde(rename = "DT_STRING")]
    String,
    #[serde(rename = "DT_SHORT")]
    Short,
    #[serde(rename = "DT_FLOAT")]
    Float,
    #[serde(rename = "DT_BOOLEAN")]
    Boolean,
    #[serde(rename = "DT_BYTE")]
    Byte,
    #[serde(rename = "DT_LONG")]
    Long,
    #[serde(rename = "DT_DOUBLE")]
    Double,
    #[serde(rename = "DT_LONGLONG")]
    LongLong,
    /// `YYYYMMDDhhmmss` with optional fractional digits.
    #[serde(rename = "DT_DATE")]
    Date,
    #[serde(rename = "DT_BYTESTR")]
    ByteStr,
    #[serde(rename = "DT_ENUM")]
    Enum,
    #[serde(rename = "DS_STRING")]
    StringSequence,
    #[serde(rename = "DS_SHORT")]
    ShortSequence,
    #[serde(rename = "DS_FLOAT")]
    FloatSequence,
    #[serde(rename = "DS_BOOLEAN")]
    BooleanSequence,
    #[serde(rename = "DS_BYTE")]
    ByteSequence,
    #[serde(rename = "DS_LONG")]
    LongSequence,
    #[serde(rename = "DS_DOUBLE")]
    DoubleSequence,
    #[serde(rename = "DS_LONGLONG")]
    LongLongSequence,
    #[serde(rename = "DS_DATE")]
    DateSequence,
    #[serde(rename = "DS_BYTESTR")]
    ByteStrSequence,
    #[serde(rename = "DS_ENUM")]
    EnumSequence,
}

impl DataType {
    /// Whether `value` may be stored in an attribute of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DataType::Unknown => matches!(value, Value::Sequence(_)),
            other => value.data_type() == *other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Unknown => "DT_UNKNOWN",
            DataType::String => "DT_STRING",
            DataType::Short => "DT_SHORT",
            DataType::Float => "DT_FLOAT",
            DataType::Boolean => "DT_BOOLEAN",
            DataType::Byte => "DT_BYTE",
            DataType::Long => "DT_LONG",
            DataType::Double => "DT_DOUBLE",
            DataType::LongLong => "DT_LONGLONG",
            DataType::Date => "DT_DATE",
            DataType::ByteStr => "DT_BYTESTR",
            DataType::Enum => "DT_ENUM",
            DataType::StringSequence => "DS_STRING",
            DataType::ShortSequence => "DS_SHORT",
            DataType::FloatSequence => "DS_FLOAT",
            DataType::BooleanSequence => "DS_BOOLEAN",
            DataType::ByteSequence => "DS_BYTE",
            DataType::LongSequence => "DS_LONG",
            DataType::DoubleSequence => "DS_DOUBLE",
            DataType::LongLongSequence => "DS_LONGLONG",
            DataType::DateSequence => "DS_DATE",
            DataType::ByteStrSequence => "DS_BYTESTR",
            DataType::EnumSequence => "DS_ENUM",
        }
    }

    /// Code of this type in the `datatype_enum` enumeration.
    pub fn code(&self) -> i32 {
        match self {
            DataType::Unknown => 0,
            DataType::String => 1,
            DataType::Short => 2,
            DataType::Float => 3,
            DataType::Boolean => 4,
            DataType::Byte => 5,
            DataType::Long => 6,
            DataType::Double => 7,
            DataType::LongLong => 8,
            DataType::Date => 10,
            DataType::ByteStr => 11,
            DataType::StringSequence => 13,
            DataType::ShortSequence => 14,
            DataType::FloatSequence => 15,
            DataType::BooleanSequence => 16,
            DataType::ByteSequence => 17,
            DataType::LongSequence => 18,
            DataType::DoubleSequence => 19,
            DataType::LongLongSequence => 20,
            DataType::DateSequence => 22,
            DataType::ByteStrSequence => 23,
            DataType::Enum => 30,
            DataType::EnumSequence => 31,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A homogeneous sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    String(Vec<String>),
    Short(Vec<i16>),
    Float(Vec<f32>),
    Boolean(Vec<bool>),
    Byte(Vec<u8>),
    Long(Vec<i32>),
    Double(Vec<f64>),
    LongLong(Vec<i64>),
    Date(Vec<String>),
    ByteStr(Vec<Vec<u8>>),
    Enum(Vec<i32>),
}

impl Sequence {
    pub fn len(&self) -> usize {
        match self {
            Sequence::String(v) | Sequence::Date(v) => v.len(),
            Sequence::Short(v) => v.len(),
            Sequence::Float(v) => v.len(),
            Sequence::Boolean(v) => v.len(),
            Sequence::Byte(v) => v.len(),
            Sequence::Long(v) | Sequence::Enum(v) => v.len(),
            Sequence::Double(v) => v.len(),
            Sequence::LongLong(v) => v.len(),
            Sequence::ByteStr(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Sequence::String(_) => DataType::StringSequence,
            Sequence::Short(_) => DataType::ShortSequence,
            Sequence::Float(_) => DataType::FloatSequence,
            Sequence::Boolean(_) => DataType::BooleanSequence,
            Sequence::Byte(_) => DataType::ByteSequence,
            Sequence::Long(_) => DataType::LongSequence,
            Sequence::Double(_) => DataType::DoubleSequence,
            Sequence::LongLong(_) => DataType::LongLongSequence,
            Sequence::Date(_) => DataType::DateSequence,
            Sequence::ByteStr(_) => DataType::ByteStrSequence,
            Sequence::Enum(_) => DataType::EnumSequence,
        }
    }

    /// Element `index` as a scalar value.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Sequence::String(v) => v.get(index).cloned().map(Value::String),
            Sequence::Short(v) => v.get(index).copied().map(Value::Short),
            Sequence::Float(v) => v.get(index).copied().map(Value::Float),
            Sequence::Boolean(v) => v.get(index).copied().map(Value::Boolean),
            Sequence::Byte(v) => v.get(index).copied().map(Value::Byte),
            Sequence::Long(v) => v.get(index).copied().map(Value::Long),
            Sequence::Double(v) => v.get(index).copied().map(Value::Double),
            Sequence::LongLong(v) => v.get(index).copied().map(Value::LongLong),
            Sequence::Date(v) => v.get(index).cloned().map(Value::Date),
            Sequence::ByteStr(v) => v.get(index).cloned().map(Value::ByteStr),
            Sequence::Enum(v) => v.get(index).copied().map(Value::Enum),
        }
    }

    /// Numeric view of element `index`, `None` for strings, byte strings and
    /// out-of-range indices.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Sequence::Short(v) => v.get(index).map(|x| *x as f64),
            Sequence::Float(v) => v.get(index).map(|x| *x as f64),
            Sequence::Boolean(v) => v.get(index).map(|x| u8::from(*x) as f64),
            Sequence::Byte(v) => v.get(index).map(|x| *x as f64),
            Sequence::Long(v) | Sequence::Enum(v) => v.get(index).map(|x| *x as f64),
            Sequence::Double(v) => v.get(index).copied(),
            Sequence::LongLong(v) => v.get(index).map(|x| *x as f64),
            Sequence::String(_) | Sequence::Date(_) | Sequence::ByteStr(_) => None,
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Short(i16),
    Float(f32),
    Boolean(bool),
    Byte(u8),
    Long(i32),
    Double(f64),
    LongLong(i64),
    Date(String),
    ByteStr(Vec<u8>),
    /// Item value of the attribute's enumeration.
    Enum(i32),
    Sequence(Sequence),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::String(_) => DataType::String,
            Value::Short(_) => DataType::Short,
            Value::Float(_) => DataType::Float,
            Value::Boolean(_) => DataType::Boolean,
            Value::Byte(_) => DataType::Byte,
            Value::Long(_) => DataType::Long,
            Value::Double(_) => DataType::Double,
            Value::LongLong(_) => DataType::LongLong,
            Value::Date(_) => DataType::Date,
            Value::ByteStr(_) => DataType::ByteStr,
            Value::Enum(_) => DataType::Enum,
            Value::Sequence(s) => s.data_type(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of scalar integer and enum values.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Short(v) => Some(v as i64),
            Value::Byte(v) => Some(v as i64),
            Value::Long(v) | Value::Enum(v) => Some(v as i64),
            Value::LongLong(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }
}

/// ODS value flags (`AO_VF_*` bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flag(pub u16);

impl Flag {
    pub const VALID_BIT: u16 = 0x01;
    pub const VISIBLE_BIT: u16 = 0x02;
    pub const UNMODIFIED_BIT: u16 = 0x04;
    pub const DEFINED_BIT: u16 = 0x08;

    /// All four bits set.
    pub const VALID: Flag = Flag(15);
    /// Defined but not valid: an invalidated measurement value.
    pub const INVALID: Flag = Flag(Self::VISIBLE_BIT | Self::UNMODIFIED_BIT | Self::DEFINED_BIT);

    pub fn is_valid(&self) -> bool {
        self.0 & Self::VALID_BIT != 0
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::VALID
    }
}

/// Flags of a stored value: one for a scalar (or a whole sequence), or one
/// per sequence element.
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Scalar(Flag),
    PerElement(Vec<Flag>),
}

impl Validity {
    /// Flag of element `index` (or of the scalar).
    pub fn flag(&self, index: usize) -> Flag {
        match self {
            Validity::Scalar(flag) => *flag,
            Validity::PerElement(flags) => flags.get(index).copied().unwrap_or(Flag::INVALID),
        }
    }
}

impl Default for Validity {
    fn default() -> Self {
        Validity::Scalar(Flag::VALID)
    }
}
