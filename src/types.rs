//! Shared types used across the parser, the decoder and the data model.

use serde::{Deserialize, Serialize};

/// Byte order of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Intel byte order.
    #[default]
    LittleEndian,
    /// Motorola byte order.
    BigEndian,
}

/// Character encoding of a fixed-length string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StringEncoding {
    /// ISO-8859-1, every byte maps to one character.
    #[default]
    Latin1,
    /// UTF-8, invalid sequences are replaced.
    Utf8,
}

/// A raw sample as it comes out of the byte decoder, before conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Unsigned integer (up to 64 bits)
    UnsignedInteger(u64),
    /// Signed integer (up to 64 bits)
    SignedInteger(i64),
    /// Floating point value (32 or 64 bit)
    Float(f64),
    /// Text string
    String(String),
    /// Raw byte array
    ByteArray(Vec<u8>),
}

impl RawValue {
    /// Returns true if this is an integer value (signed or unsigned).
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            RawValue::UnsignedInteger(_) | RawValue::SignedInteger(_)
        )
    }

    /// Attempts to convert to f64, useful for numeric operations.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::UnsignedInteger(v) => Some(*v as f64),
            RawValue::SignedInteger(v) => Some(*v as f64),
            RawValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}
