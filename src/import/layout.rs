//! Mapping of record fields onto external component value types.

use crate::{
    external::TypeSpec,
    parsing::{ChannelLayout, TextEncoding, ValueKind},
    types::ByteOrder,
};

/// Widest string or byte field `ao_bit_count` can describe.
const MAX_FIELD_BYTES: u32 = i16::MAX as u32 / 8;

/// How the values of a stored channel reach the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Addressed in place through external components.
    External {
        value_type: TypeSpec,
        bit_offset: u8,
        /// Set for bit fields, strings and byte strings.
        bit_count: Option<u16>,
    },
    /// Decoded during import and stored as explicit values.
    Materialize,
}

fn by_order(order: ByteOrder, little: TypeSpec, big: TypeSpec) -> TypeSpec {
    match order {
        ByteOrder::LittleEndian => little,
        ByteOrder::BigEndian => big,
    }
}

/// Pick the value type for a fixed-length channel.
///
/// Byte-aligned integers and floats of native width use the plain types;
/// everything else becomes a bit field with explicit offset and width.
pub fn placement(layout: &ChannelLayout) -> Placement {
    let aligned = layout.bit_offset == 0;
    let order = layout.byte_order;
    let bits = layout.bit_count;
    let plain = |value_type| Placement::External {
        value_type,
        bit_offset: 0,
        bit_count: None,
    };
    let bit_field = |little, big| Placement::External {
        value_type: by_order(order, little, big),
        bit_offset: layout.bit_offset,
        bit_count: Some(bits as u16),
    };
    let bytes_field = |value_type, len: usize| {
        let len = len as u32;
        if len == 0 || len > MAX_FIELD_BYTES {
            Placement::Materialize
        } else {
            Placement::External {
                value_type,
                bit_offset: 0,
                bit_count: Some((len * 8) as u16),
            }
        }
    };

    match layout.kind {
        ValueKind::Unsigned => match (aligned, bits) {
            (true, 8) => plain(TypeSpec::Byte),
            (true, 16) => plain(by_order(order, TypeSpec::UShort, TypeSpec::UShortBeo)),
            (true, 32) => plain(by_order(order, TypeSpec::ULong, TypeSpec::ULongBeo)),
            _ => bit_field(TypeSpec::BitUint, TypeSpec::BitUintBeo),
        },
        ValueKind::Signed => match (aligned, bits) {
            (true, 8) => plain(TypeSpec::SByte),
            (true, 16) => plain(by_order(order, TypeSpec::Short, TypeSpec::ShortBeo)),
            (true, 32) => plain(by_order(order, TypeSpec::Long, TypeSpec::LongBeo)),
            (true, 64) => plain(by_order(order, TypeSpec::LongLong, TypeSpec::LongLongBeo)),
            _ => bit_field(TypeSpec::BitInt, TypeSpec::BitIntBeo),
        },
        ValueKind::Float => match (aligned, bits) {
            (true, 32) => plain(by_order(order, TypeSpec::Float4, TypeSpec::Float4Beo)),
            (true, 64) => plain(by_order(order, TypeSpec::Float8, TypeSpec::Float8Beo)),
            _ => bit_field(TypeSpec::BitFloat, TypeSpec::BitFloatBeo),
        },
        ValueKind::String(TextEncoding::Latin1) => {
            bytes_field(TypeSpec::String, layout.byte_len())
        }
        ValueKind::String(TextEncoding::Utf8) => {
            bytes_field(TypeSpec::StringUtf8, layout.byte_len())
        }
        ValueKind::String(TextEncoding::Utf16(_)) => Placement::Materialize,
        ValueKind::ByteArray => bytes_field(TypeSpec::ByteStr, layout.byte_len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(kind: ValueKind, bit_offset: u8, bit_count: u32, order: ByteOrder) -> ChannelLayout {
        ChannelLayout {
            byte_offset: 0,
            bit_offset,
            bit_count,
            kind,
            byte_order: order,
        }
    }

    #[test]
    fn native_widths_use_plain_types() {
        let le = ByteOrder::LittleEndian;
        let be = ByteOrder::BigEndian;
        assert_eq!(
            placement(&layout(ValueKind::Unsigned, 0, 16, be)),
            Placement::External {
                value_type: TypeSpec::UShortBeo,
                bit_offset: 0,
                bit_count: None
            }
        );
        assert_eq!(
            placement(&layout(ValueKind::Float, 0, 64, le)),
            Placement::External {
                value_type: TypeSpec::Float8,
                bit_offset: 0,
                bit_count: None
            }
        );
    }

    #[test]
    fn packed_and_wide_unsigned_become_bit_fields() {
        let le = ByteOrder::LittleEndian;
        assert_eq!(
            placement(&layout(ValueKind::Unsigned, 6, 14, le)),
            Placement::External {
                value_type: TypeSpec::BitUint,
                bit_offset: 6,
                bit_count: Some(14)
            }
        );
        // no plain unsigned 64-bit type exists
        assert_eq!(
            placement(&layout(ValueKind::Unsigned, 0, 64, le)),
            Placement::External {
                value_type: TypeSpec::BitUint,
                bit_offset: 0,
                bit_count: Some(64)
            }
        );
    }

    #[test]
    fn strings() {
        let le = ByteOrder::LittleEndian;
        assert_eq!(
            placement(&layout(ValueKind::String(TextEncoding::Utf8), 0, 80, le)),
            Placement::External {
                value_type: TypeSpec::StringUtf8,
                bit_offset: 0,
                bit_count: Some(80)
            }
        );
        assert_eq!(
            placement(&layout(
                ValueKind::String(TextEncoding::Utf16(ByteOrder::BigEndian)),
                0,
                80,
                le
            )),
            Placement::Materialize
        );
        assert_eq!(
            placement(&layout(ValueKind::ByteArray, 0, 8 * 5000, le)),
            Placement::Materialize
        );
    }
}
