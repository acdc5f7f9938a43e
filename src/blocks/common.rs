//! Common types, traits, and helper functions for MDF block parsing.
//!
//! This module provides:
//! - [`BlockHeader`]: The 24-byte header present in all MDF 4.x blocks
//! - [`BlockParse`]: Trait for turning a [`RawBlock`] into a typed block
//! - [`DataType`]: Enum representing MDF 4.x channel data types
//! - Bounds-checked little-endian readers shared by the 3.x and 4.x parsers

use crate::{Error, Result, parsing::RawBlock};

// ============================================================================
// Byte Parsing Helpers
// ============================================================================

/// Validate that a buffer has at least `expected` bytes.
///
/// Returns `Err(TooShortBuffer)` if the buffer is too small.
#[inline]
pub fn validate_buffer_size(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() < expected {
        return Err(Error::TooShortBuffer {
            actual: bytes.len(),
            expected,
            file: file!(),
            line: line!(),
        });
    }
    Ok(())
}

fn array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    validate_buffer_size(bytes, offset + N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    Ok(out)
}

/// Read a u8 from a byte slice at the given offset.
#[inline]
pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    validate_buffer_size(bytes, offset + 1)?;
    Ok(bytes[offset])
}

/// Read a u16 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    array(bytes, offset).map(u16::from_le_bytes)
}

#[inline]
pub fn read_i16(bytes: &[u8], offset: usize) -> Result<i16> {
    array(bytes, offset).map(i16::from_le_bytes)
}

/// Read a u32 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    array(bytes, offset).map(u32::from_le_bytes)
}

/// Read a u64 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_u64(bytes: &[u8], offset: usize) -> Result<u64> {
    array(bytes, offset).map(u64::from_le_bytes)
}

/// Read an f64 from a byte slice at the given offset (little-endian).
#[inline]
pub fn read_f64(bytes: &[u8], offset: usize) -> Result<f64> {
    array(bytes, offset).map(f64::from_le_bytes)
}

/// Read a fixed-size, NUL padded Latin-1 field.
pub fn read_fixed_str(bytes: &[u8], offset: usize, len: usize) -> Result<String> {
    validate_buffer_size(bytes, offset + len)?;
    let field = &bytes[offset..offset + len];
    let end = field.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(field[..end].iter().map(|&b| b as char).collect::<String>().trim_end().to_string())
}

/// Link at `index` of a 4.x link section, or 0 when the block declares fewer links.
#[inline]
pub fn link(links: &[u64], index: usize) -> u64 {
    links.get(index).copied().unwrap_or(0)
}

// ============================================================================
// Block header and parse trait
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// 4-byte block type identifier (e.g., "##HD", "##DG").
    pub id: String,
    /// Reserved field, always 0.
    pub reserved: u32,
    /// Total length of the block in bytes, including this header.
    pub length: u64,
    /// Number of link fields in this block.
    pub link_count: u64,
}

impl BlockHeader {
    pub const SIZE: usize = 24;

    /// Parse a block header from the first 24 bytes of `bytes`.
    ///
    /// Returns [`Error::TooShortBuffer`] when the slice is smaller than 24
    /// bytes. The id is not validated here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validate_buffer_size(bytes, Self::SIZE)?;
        Ok(Self {
            id: String::from_utf8_lossy(&bytes[0..4]).into_owned(),
            reserved: read_u32(bytes, 4)?,
            length: read_u64(bytes, 8)?,
            link_count: read_u64(bytes, 16)?,
        })
    }
}

/// A typed view of one block, built from the block reader's raw output.
pub trait BlockParse: Sized {
    /// Block identifier as stored in the file (`"##CN"`, `"CN"`, ...).
    const ID: &'static str;

    /// Check the identifier of `raw` against [`Self::ID`].
    fn check_id(raw: &RawBlock) -> Result<()> {
        if raw.id != Self::ID {
            return Err(Error::BlockIDError {
                actual: raw.id.clone(),
                expected: Self::ID.to_string(),
                position: raw.position,
            });
        }
        Ok(())
    }

    fn from_raw(raw: &RawBlock) -> Result<Self>;
}

// ============================================================================
// Channel data types (4.x cn_data_type)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    UnsignedIntegerLE,
    UnsignedIntegerBE,
    SignedIntegerLE,
    SignedIntegerBE,
    FloatLE,
    FloatBE,
    StringLatin1,
    StringUtf8,
    StringUtf16LE,
    StringUtf16BE,
    ByteArray,
    MimeSample,
    MimeStream,
    CanOpenDate,
    CanOpenTime,
    ComplexLE,
    ComplexBE,
    Unknown(u8),
}

impl DataType {
    /// Convert a numeric representation to the corresponding `DataType`.
    /// Values outside the known range yield `DataType::Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => DataType::UnsignedIntegerLE,
            1 => DataType::UnsignedIntegerBE,
            2 => DataType::SignedIntegerLE,
            3 => DataType::SignedIntegerBE,
            4 => DataType::FloatLE,
            5 => DataType::FloatBE,
            6 => DataType::StringLatin1,
            7 => DataType::StringUtf8,
            8 => DataType::StringUtf16LE,
            9 => DataType::StringUtf16BE,
            10 => DataType::ByteArray,
            11 => DataType::MimeSample,
            12 => DataType::MimeStream,
            13 => DataType::CanOpenDate,
            14 => DataType::CanOpenTime,
            15 => DataType::ComplexLE,
            16 => DataType::ComplexBE,
            other => DataType::Unknown(other),
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataType::UnsignedIntegerLE => write!(f, "uint (LE)"),
            DataType::UnsignedIntegerBE => write!(f, "uint (BE)"),
            DataType::SignedIntegerLE => write!(f, "int (LE)"),
            DataType::SignedIntegerBE => write!(f, "int (BE)"),
            DataType::FloatLE => write!(f, "float (LE)"),
            DataType::FloatBE => write!(f, "float (BE)"),
            DataType::StringLatin1 => write!(f, "string (Latin-1)"),
            DataType::StringUtf8 => write!(f, "string (UTF-8)"),
            DataType::StringUtf16LE => write!(f, "string (UTF-16 LE)"),
            DataType::StringUtf16BE => write!(f, "string (UTF-16 BE)"),
            DataType::ByteArray => write!(f, "byte array"),
            DataType::MimeSample => write!(f, "MIME sample"),
            DataType::MimeStream => write!(f, "MIME stream"),
            DataType::CanOpenDate => write!(f, "CANopen date"),
            DataType::CanOpenTime => write!(f, "CANopen time"),
            DataType::ComplexLE => write!(f, "complex (LE)"),
            DataType::ComplexBE => write!(f, "complex (BE)"),
            DataType::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_are_bounds_checked() {
        let bytes = [1u8, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(read_u64(&bytes, 0).unwrap(), 1);
        assert!(read_u64(&bytes, 1).is_err());
        assert!(read_u8(&bytes, 8).is_err());
        assert_eq!(read_u16(&bytes, 0).unwrap(), 1);
    }

    #[test]
    fn fixed_strings_trim_padding() {
        let mut field = *b"speed\0\0\0";
        assert_eq!(read_fixed_str(&field, 0, 8).unwrap(), "speed");
        field[5] = b' ';
        assert_eq!(read_fixed_str(&field, 0, 6).unwrap(), "speed");
    }

    #[test]
    fn header_parsing() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"##DG");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&64u64.to_le_bytes());
        bytes.extend_from_slice(&4u64.to_le_bytes());
        let header = BlockHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.id, "##DG");
        assert_eq!(header.length, 64);
        assert_eq!(header.link_count, 4);
        assert!(BlockHeader::from_bytes(&bytes[..20]).is_err());
    }

    #[test]
    fn unknown_data_type_keeps_code() {
        assert_eq!(DataType::from_u8(42), DataType::Unknown(42));
        assert_eq!(DataType::from_u8(5), DataType::FloatBE);
    }
}
