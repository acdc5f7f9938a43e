//! Primitive byte decoding.
//!
//! Every function here is pure: it takes the bytes of one stored field and
//! returns the decoded primitive. Bit fields are extracted after the bytes have
//! been arranged according to the byte order, with bit 0 being the least
//! significant bit of the reordered stream.

use crate::{
    Error, Result,
    types::{ByteOrder, StringEncoding},
};

/// Number of bytes spanned by a bit field starting at `bit_offset`.
#[inline]
pub fn field_len(bit_offset: u32, bit_count: u32) -> usize {
    ((bit_offset + bit_count) as usize).div_ceil(8).max(1)
}

fn check_bits(bit_offset: u32, bit_count: u32) -> Result<()> {
    if !(1..=64).contains(&bit_count) {
        return Err(Error::MalformedValue(format!(
            "bit count {bit_count} outside 1..=64"
        )));
    }
    // the field is folded into a u128
    if bit_offset + bit_count > 128 {
        return Err(Error::MalformedValue(format!(
            "bit offset {bit_offset} too large for a {bit_count} bit field"
        )));
    }
    Ok(())
}

fn require(bytes: &[u8], needed: usize) -> Result<()> {
    if bytes.len() < needed {
        return Err(Error::MalformedValue(format!(
            "need {needed} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}

/// Fold the first `len` bytes into an integer following `byte_order`.
fn fold(bytes: &[u8], len: usize, byte_order: ByteOrder) -> u128 {
    let slice = &bytes[..len];
    match byte_order {
        ByteOrder::LittleEndian => slice
            .iter()
            .rev()
            .fold(0u128, |acc, &b| (acc << 8) | b as u128),
        ByteOrder::BigEndian => slice.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128),
    }
}

#[inline]
fn mask(bit_count: u32) -> u64 {
    if bit_count >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_count) - 1
    }
}

/// Decode an unsigned integer of `bit_count` bits starting at `bit_offset`.
///
/// ```
/// use mdf_ods::parsing::decoder::decode_unsigned;
/// use mdf_ods::ByteOrder;
///
/// let v = decode_unsigned(&[0xAB, 0xCD, 0xEF], 6, 14, ByteOrder::LittleEndian).unwrap();
/// assert_eq!(v, 16182);
/// ```
pub fn decode_unsigned(
    bytes: &[u8],
    bit_offset: u32,
    bit_count: u32,
    byte_order: ByteOrder,
) -> Result<u64> {
    check_bits(bit_offset, bit_count)?;
    let len = field_len(bit_offset, bit_count);
    require(bytes, len)?;
    let raw = fold(bytes, len, byte_order) >> bit_offset;
    Ok(raw as u64 & mask(bit_count))
}

/// Decode a two's-complement signed integer of `bit_count` bits.
pub fn decode_signed(
    bytes: &[u8],
    bit_offset: u32,
    bit_count: u32,
    byte_order: ByteOrder,
) -> Result<i64> {
    let unsigned = decode_unsigned(bytes, bit_offset, bit_count, byte_order)?;
    if bit_count == 64 {
        return Ok(unsigned as i64);
    }
    let sign_bit = 1u64 << (bit_count - 1);
    Ok(if unsigned & sign_bit != 0 {
        (unsigned | !mask(bit_count)) as i64
    } else {
        unsigned as i64
    })
}

/// Decode an IEEE 754 single precision value.
pub fn decode_f32(bytes: &[u8], byte_order: ByteOrder) -> Result<f32> {
    require(bytes, 4)?;
    let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
    Ok(match byte_order {
        ByteOrder::LittleEndian => f32::from_le_bytes(arr),
        ByteOrder::BigEndian => f32::from_be_bytes(arr),
    })
}

/// Decode an IEEE 754 double precision value.
pub fn decode_f64(bytes: &[u8], byte_order: ByteOrder) -> Result<f64> {
    require(bytes, 8)?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&bytes[..8]);
    Ok(match byte_order {
        ByteOrder::LittleEndian => f64::from_le_bytes(arr),
        ByteOrder::BigEndian => f64::from_be_bytes(arr),
    })
}

/// Decode a float stored in `bit_count` bits (32 or 64) at `bit_offset`.
pub fn decode_float_bits(
    bytes: &[u8],
    bit_offset: u32,
    bit_count: u32,
    byte_order: ByteOrder,
) -> Result<f64> {
    let bits = decode_unsigned(bytes, bit_offset, bit_count, byte_order)?;
    match bit_count {
        32 => Ok(f32::from_bits(bits as u32) as f64),
        64 => Ok(f64::from_bits(bits)),
        other => Err(Error::MalformedValue(format!(
            "float fields must be 32 or 64 bits, got {other}"
        ))),
    }
}

/// Decode a fixed-length string field, stopping at the first NUL.
pub fn decode_fixed_string(bytes: &[u8], length: usize, encoding: StringEncoding) -> Result<String> {
    require(bytes, length)?;
    let field = &bytes[..length];
    let end = field.iter().position(|&b| b == 0).unwrap_or(length);
    let field = &field[..end];
    Ok(match encoding {
        StringEncoding::Latin1 => field.iter().map(|&b| b as char).collect(),
        StringEncoding::Utf8 => String::from_utf8_lossy(field).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BYTES: [u8; 3] = [0xAB, 0xCD, 0xEF];

    #[test]
    fn bit_field_little_endian() {
        assert_eq!(
            decode_unsigned(&BYTES, 6, 14, ByteOrder::LittleEndian).unwrap(),
            16182
        );
        assert_eq!(
            decode_signed(&BYTES, 6, 14, ByteOrder::LittleEndian).unwrap(),
            -202
        );
    }

    #[test]
    fn bit_field_big_endian() {
        assert_eq!(
            decode_unsigned(&BYTES, 6, 14, ByteOrder::BigEndian).unwrap(),
            12087
        );
        assert_eq!(
            decode_signed(&BYTES, 6, 14, ByteOrder::BigEndian).unwrap(),
            -4297
        );
    }

    #[test]
    fn full_width_values() {
        let bytes = u64::MAX.to_le_bytes();
        assert_eq!(
            decode_unsigned(&bytes, 0, 64, ByteOrder::LittleEndian).unwrap(),
            u64::MAX
        );
        assert_eq!(
            decode_signed(&bytes, 0, 64, ByteOrder::LittleEndian).unwrap(),
            -1
        );
        let shifted = [0xFFu8; 9];
        assert_eq!(
            decode_unsigned(&shifted, 4, 64, ByteOrder::LittleEndian).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn short_input_is_malformed() {
        let err = decode_unsigned(&[0x01], 4, 8, ByteOrder::LittleEndian).unwrap_err();
        assert!(matches!(err, Error::MalformedValue(_)));
        assert!(decode_f64(&[0u8; 7], ByteOrder::LittleEndian).is_err());
        assert!(decode_fixed_string(b"abc", 4, StringEncoding::Utf8).is_err());
    }

    #[test]
    fn bit_count_range_checked() {
        assert!(decode_unsigned(&[0u8; 9], 0, 0, ByteOrder::LittleEndian).is_err());
        assert!(decode_unsigned(&[0u8; 9], 0, 65, ByteOrder::LittleEndian).is_err());
    }

    #[test]
    fn floats_honor_byte_order() {
        let le = 1.5f32.to_le_bytes();
        let be = 1.5f64.to_be_bytes();
        assert_eq!(decode_f32(&le, ByteOrder::LittleEndian).unwrap(), 1.5);
        assert_eq!(decode_f64(&be, ByteOrder::BigEndian).unwrap(), 1.5);
        assert_eq!(
            decode_float_bits(&le, 0, 32, ByteOrder::LittleEndian).unwrap(),
            1.5
        );
    }

    #[test]
    fn strings_stop_at_nul() {
        let field = b"rpm\0junk";
        assert_eq!(
            decode_fixed_string(field, 8, StringEncoding::Latin1).unwrap(),
            "rpm"
        );
        let latin = [0x47, 0xE4, 0x00];
        assert_eq!(
            decode_fixed_string(&latin, 3, StringEncoding::Latin1).unwrap(),
            "G\u{e4}"
        );
    }
}
