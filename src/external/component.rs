//! External component descriptors and raw value type codes.

use crate::{
    Error, Result,
    model::{InstanceRef, Model, Value},
    parsing::decoder::field_len,
    types::ByteOrder,
};
use std::path::PathBuf;

/// Raw value type of an external component (the ODS `typespec_enum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Boolean,
    Byte,
    Short,
    Long,
    LongLong,
    Float4,
    Float8,
    ShortBeo,
    LongBeo,
    LongLongBeo,
    Float4Beo,
    Float8Beo,
    String,
    ByteStr,
    Blob,
    BooleanFlagsBeo,
    ByteFlagsBeo,
    StringFlagsBeo,
    ByteStrBeo,
    SByte,
    SByteFlagsBeo,
    UShort,
    UShortBeo,
    ULong,
    ULongBeo,
    StringUtf8,
    StringUtf8Beo,
    BitInt,
    BitIntBeo,
    BitUint,
    BitUintBeo,
    BitFloat,
    BitFloatBeo,
}

/// How the bytes of a [`TypeSpec`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Boolean,
    Unsigned,
    Signed,
    Float,
    Latin1,
    Utf8,
    Bytes,
    /// Blobs and the `*_flags_beo` layouts.
    Unsupported,
}

const ALL: [TypeSpec; 33] = [
    TypeSpec::Boolean,
    TypeSpec::Byte,
    TypeSpec::Short,
    TypeSpec::Long,
    TypeSpec::LongLong,
    TypeSpec::Float4,
    TypeSpec::Float8,
    TypeSpec::ShortBeo,
    TypeSpec::LongBeo,
    TypeSpec::LongLongBeo,
    TypeSpec::Float4Beo,
    TypeSpec::Float8Beo,
    TypeSpec::String,
    TypeSpec::ByteStr,
    TypeSpec::Blob,
    TypeSpec::BooleanFlagsBeo,
    TypeSpec::ByteFlagsBeo,
    TypeSpec::StringFlagsBeo,
    TypeSpec::ByteStrBeo,
    TypeSpec::SByte,
    TypeSpec::SByteFlagsBeo,
    TypeSpec::UShort,
    TypeSpec::UShortBeo,
    TypeSpec::ULong,
    TypeSpec::ULongBeo,
    TypeSpec::StringUtf8,
    TypeSpec::StringUtf8Beo,
    TypeSpec::BitInt,
    TypeSpec::BitIntBeo,
    TypeSpec::BitUint,
    TypeSpec::BitUintBeo,
    TypeSpec::BitFloat,
    TypeSpec::BitFloatBeo,
];

impl TypeSpec {
    pub fn from_code(code: i32) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| ALL.get(i).copied())
            .ok_or_else(|| Error::UnsupportedDataType(format!("typespec code {code}")))
    }

    pub fn code(self) -> i32 {
        ALL.iter().position(|t| *t == self).unwrap_or_default() as i32
    }

    pub fn byte_order(self) -> ByteOrder {
        use TypeSpec::*;
        match self {
            ShortBeo | LongBeo | LongLongBeo | Float4Beo | Float8Beo | BooleanFlagsBeo
            | ByteFlagsBeo | StringFlagsBeo | ByteStrBeo | SByteFlagsBeo | UShortBeo | ULongBeo
            | StringUtf8Beo | BitIntBeo | BitUintBeo | BitFloatBeo => ByteOrder::BigEndian,
            _ => ByteOrder::LittleEndian,
        }
    }

    pub fn kind(self) -> RawKind {
        use TypeSpec::*;
        match self {
            Boolean => RawKind::Boolean,
            Byte | UShort | UShortBeo | ULong | ULongBeo | BitUint | BitUintBeo => {
                RawKind::Unsigned
            }
            SByte | Short | ShortBeo | Long | LongBeo | LongLong | LongLongBeo | BitInt
            | BitIntBeo => RawKind::Signed,
            Float4 | Float4Beo | Float8 | Float8Beo | BitFloat | BitFloatBeo => RawKind::Float,
            String => RawKind::Latin1,
            StringUtf8 | StringUtf8Beo => RawKind::Utf8,
            ByteStr | ByteStrBeo => RawKind::Bytes,
            Blob | BooleanFlagsBeo | ByteFlagsBeo | StringFlagsBeo | SByteFlagsBeo => {
                RawKind::Unsupported
            }
        }
    }

    /// Size of the fixed-width types in bytes.
    pub fn fixed_size(self) -> Option<u32> {
        use TypeSpec::*;
        Some(match self {
            Boolean | Byte | SByte => 1,
            Short | ShortBeo | UShort | UShortBeo => 2,
            Long | LongBeo | ULong | ULongBeo | Float4 | Float4Beo => 4,
            LongLong | LongLongBeo | Float8 | Float8Beo => 8,
            _ => return None,
        })
    }

    /// Bit-packed types addressed through `ao_bit_offset`/`ao_bit_count`.
    pub fn is_bit_field(self) -> bool {
        use TypeSpec::*;
        matches!(
            self,
            BitInt | BitIntBeo | BitUint | BitUintBeo | BitFloat | BitFloatBeo
        )
    }
}

/// Location of a per-value invalidation bit relative to the block start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationLocation {
    pub byte_offset: u64,
    pub bit: u8,
}

/// One contiguous fragment of a column's raw values in an external file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalComponent {
    pub ordinal: i32,
    pub filename: PathBuf,
    pub start_offset: u64,
    /// Number of values in this fragment.
    pub length: u64,
    /// Distance between consecutive blocks (the record size).
    pub block_size: u64,
    pub values_per_block: u64,
    /// Offset of the first value within a block.
    pub value_offset: u64,
    pub value_type: TypeSpec,
    pub bit_offset: u8,
    /// Width of bit fields, strings and byte strings.
    pub bit_count: Option<u16>,
    pub invalidation: Option<InvalidationLocation>,
}

/// Extension attribute names carrying the invalidation bit location.
pub const INVALIDATION_BYTE_OFFSET: &str = "invalidation_byte_offset";
pub const INVALIDATION_BIT: &str = "invalidation_bit";

impl ExternalComponent {
    /// Width of the stored value in bits.
    pub fn value_bits(&self) -> Result<u32> {
        if self.value_type.kind() == RawKind::Unsupported {
            return Err(Error::UnsupportedDataType(format!("{:?}", self.value_type)));
        }
        if let Some(size) = self.value_type.fixed_size() {
            return Ok(size * 8);
        }
        match self.bit_count {
            Some(bits) if bits > 0 => Ok(bits as u32),
            _ => Err(Error::MalformedValue(format!(
                "{:?} component without a bit count",
                self.value_type
            ))),
        }
    }

    /// Bytes read per value, also the distance between values in a block.
    pub fn value_size(&self) -> Result<u64> {
        let bits = self.value_bits()?;
        Ok(if self.value_type.is_bit_field() {
            field_len(self.bit_offset as u32, bits) as u64
        } else {
            (bits as u64).div_ceil(8)
        })
    }

    /// File position of value `index` of this fragment.
    pub fn position(&self, index: u64) -> Result<u64> {
        let size = self.value_size()?;
        Ok(self.start_offset
            + (index / self.values_per_block) * self.block_size
            + (index % self.values_per_block) * size
            + self.value_offset)
    }

    /// Last byte (exclusive) touched when decoding the whole fragment.
    pub fn end_position(&self) -> Result<u64> {
        if self.length == 0 {
            return Ok(self.start_offset);
        }
        let mut end = self.position(self.length - 1)? + self.value_size()?;
        if let Some(inval) = self.invalidation {
            let last_block = (self.length - 1) / self.values_per_block;
            end = end.max(self.start_offset + last_block * self.block_size + inval.byte_offset + 1);
        }
        Ok(end)
    }

    /// Read the descriptor stored on an `AoExternalComponent` instance.
    pub fn load(model: &Model, instance: InstanceRef) -> Result<Self> {
        let element = model.element(instance.element)?;
        let get = |base: &str| -> Result<Option<&Value>> {
            match element.attribute_by_base(base) {
                Some(attr) => Ok(model.value(instance, &attr.name)?.map(|v| &v.value)),
                None => Ok(None),
            }
        };
        let require_int = |base: &str| -> Result<i64> {
            get(base)?
                .and_then(Value::as_i64)
                .ok_or_else(|| Error::UnknownAttribute {
                    element: element.name.clone(),
                    attribute: base.to_string(),
                })
        };
        let optional_int = |name: &str| -> Result<Option<i64>> {
            if element.attribute(name).is_none() {
                return Ok(None);
            }
            Ok(model
                .value(instance, name)?
                .and_then(|v| v.value.as_i64()))
        };
        let unsigned = |base: &str, v: i64| -> Result<u64> {
            u64::try_from(v).map_err(|_| {
                Error::MalformedValue(format!("{base} of {} is negative: {v}", element.name))
            })
        };

        let filename = get("filename_url")?
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UnknownAttribute {
                element: element.name.clone(),
                attribute: "filename_url".to_string(),
            })?;
        let filename = filename.strip_prefix("file://").unwrap_or(filename);

        let values_per_block = unsigned("valuesperblock", require_int("valuesperblock")?)?;
        if values_per_block == 0 {
            return Err(Error::MalformedValue(format!(
                "{} has zero values per block",
                element.name
            )));
        }
        let invalidation = match (
            optional_int(INVALIDATION_BYTE_OFFSET)?,
            optional_int(INVALIDATION_BIT)?,
        ) {
            (Some(byte_offset), Some(bit)) => Some(InvalidationLocation {
                byte_offset: unsigned(INVALIDATION_BYTE_OFFSET, byte_offset)?,
                bit: (bit & 7) as u8,
            }),
            _ => None,
        };

        Ok(Self {
            ordinal: require_int("ordinal_number")? as i32,
            filename: PathBuf::from(filename),
            start_offset: unsigned("start_offset", require_int("start_offset")?)?,
            length: unsigned("component_length", require_int("component_length")?)?,
            block_size: unsigned("block_size", require_int("block_size")?)?,
            values_per_block,
            value_offset: unsigned("value_offset", require_int("value_offset")?)?,
            value_type: TypeSpec::from_code(require_int("value_type")? as i32)?,
            bit_offset: get("ao_bit_offset")?
                .and_then(Value::as_i64)
                .unwrap_or(0)
                .clamp(0, 7) as u8,
            bit_count: get("ao_bit_count")?
                .and_then(Value::as_i64)
                .and_then(|b| u16::try_from(b).ok()),
            invalidation,
        })
    }
}
