use super::{BlockReader, conversion, metadata::parse_comment, reader::ByteRangeReader};
use crate::{
    Result,
    blocks::{ChannelBlock, ChannelType, ConversionBlock, DataType, v3},
    conversion::ConversionRule,
    parsing::decoder::field_len,
    types::ByteOrder,
};

/// Character encoding of a string channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf8,
    Utf16(ByteOrder),
}

/// How the stored bits of a channel are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Unsigned,
    Signed,
    /// IEEE 754, 32 or 64 bits.
    Float,
    String(TextEncoding),
    ByteArray,
}

/// Position of a channel's value inside the data bytes of a record.
///
/// `byte_offset` does not include the record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    pub byte_offset: u32,
    pub bit_offset: u8,
    pub bit_count: u32,
    pub kind: ValueKind,
    pub byte_order: ByteOrder,
}

impl ChannelLayout {
    /// Number of bytes the value spans.
    pub fn byte_len(&self) -> usize {
        field_len(self.bit_offset as u32, self.bit_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Master,
    /// Master derived from the record index, nothing stored.
    VirtualMaster,
    Data,
    /// Data derived from the record index, nothing stored.
    VirtualData,
    /// The record holds an offset into a signal data list at `signal_data`.
    VariableLength { signal_data: u64 },
}

impl ChannelRole {
    pub fn is_master(&self) -> bool {
        matches!(self, ChannelRole::Master | ChannelRole::VirtualMaster)
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, ChannelRole::VirtualMaster | ChannelRole::VirtualData)
    }
}

/// Invalidation bit of a channel, addressed like the layout: `byte_offset`
/// counts from the first data byte of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationBit {
    pub byte_offset: u32,
    pub bit: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelValidity {
    AlwaysValid,
    AllInvalid,
    Bit(InvalidationBit),
}

/// A channel in version-neutral form, with its conversion fully resolved.
#[derive(Debug, Clone)]
pub struct RawChannel {
    pub name: String,
    pub unit: Option<String>,
    pub comment: Option<String>,
    pub layout: ChannelLayout,
    pub role: ChannelRole,
    pub conversion: ConversionRule,
    pub validity: ChannelValidity,
}

impl RawChannel {
    /// Interpret a 4.x channel. Returns `None` for channels whose values
    /// cannot be represented (complex numbers, unknown types).
    pub fn from_v4<R: ByteRangeReader + ?Sized>(
        reader: &mut BlockReader<'_, R>,
        block: &ChannelBlock,
        data_bytes: u32,
    ) -> Result<Option<Self>> {
        let name = reader.read_text(block.name_addr)?.unwrap_or_default();

        let Some((kind, byte_order)) = v4_kind(block.data_type) else {
            log::warn!(
                "skipping channel {name:?}: data type {} is not supported",
                block.data_type
            );
            return Ok(None);
        };
        if kind == ValueKind::Float && !matches!(block.bit_count, 32 | 64) {
            log::warn!(
                "skipping channel {name:?}: {} bit floats are not supported",
                block.bit_count
            );
            return Ok(None);
        }

        let role = match block.channel_type {
            ChannelType::FixedLength | ChannelType::Sync | ChannelType::MaxLength => {
                ChannelRole::Data
            }
            ChannelType::VariableLength => ChannelRole::VariableLength {
                signal_data: block.data_addr,
            },
            ChannelType::Master => ChannelRole::Master,
            ChannelType::VirtualMaster => ChannelRole::VirtualMaster,
            ChannelType::VirtualData => ChannelRole::VirtualData,
            ChannelType::Unknown(other) => {
                log::warn!("skipping channel {name:?}: channel type {other} is not supported");
                return Ok(None);
            }
        };
        if block.component_addr != 0 {
            log::warn!("channel {name:?} has a composition; its members are ignored");
        }

        let conversion = conversion::resolve_v4(reader, block.conversion_addr)?;
        let mut unit = reader.read_text(block.unit_addr)?;
        if unit.is_none() && block.conversion_addr != 0 {
            let cc: ConversionBlock = reader.read(block.conversion_addr)?;
            unit = reader.read_text(cc.unit_addr)?;
        }
        let unit = unit.map(|u| parse_comment(&u).text.unwrap_or_default());
        let comment = reader
            .read_text(block.comment_addr)?
            .and_then(|c| parse_comment(&c).text);

        let validity = if block.all_invalid() {
            ChannelValidity::AllInvalid
        } else if block.has_invalidation_bit() {
            ChannelValidity::Bit(InvalidationBit {
                byte_offset: data_bytes + (block.pos_invalidation_bit >> 3),
                bit: (block.pos_invalidation_bit & 7) as u8,
            })
        } else {
            ChannelValidity::AlwaysValid
        };

        Ok(Some(Self {
            name,
            unit: unit.filter(|u| !u.is_empty()),
            comment,
            layout: ChannelLayout {
                byte_offset: block.byte_offset,
                bit_offset: block.bit_offset,
                bit_count: block.bit_count,
                kind,
                byte_order,
            },
            role,
            conversion,
            validity,
        }))
    }

    /// Interpret a 3.x channel; `default_order` comes from the identification block.
    pub fn from_v3<R: ByteRangeReader + ?Sized>(
        reader: &mut BlockReader<'_, R>,
        block: &v3::ChannelBlock,
        position: u64,
        default_order: ByteOrder,
    ) -> Result<Option<Self>> {
        let name = match reader.read_text(block.long_name_addr as u64)? {
            Some(long) if !long.is_empty() => long,
            _ => block.short_name.clone(),
        };

        let (kind, order) = match block.data_type {
            v3::V3DataType::Unsigned(order) => (ValueKind::Unsigned, order),
            v3::V3DataType::Signed(order) => (ValueKind::Signed, order),
            v3::V3DataType::Float(order) => (ValueKind::Float, order),
            v3::V3DataType::String => (ValueKind::String(TextEncoding::Latin1), None),
            v3::V3DataType::ByteArray => (ValueKind::ByteArray, None),
            other => {
                log::warn!("skipping channel {name:?}: data type {other:?} is not supported");
                return Ok(None);
            }
        };
        let bit_count = block.bit_count as u32;
        if kind == ValueKind::Float && !matches!(bit_count, 32 | 64) {
            log::warn!("skipping channel {name:?}: {bit_count} bit floats are not supported");
            return Ok(None);
        }

        let (conversion, unit) = if block.conversion_addr != 0 {
            let cc: v3::ConversionBlock = reader.read(block.conversion_addr as u64)?;
            let rule = conversion::resolve_v3(reader, &cc, block.conversion_addr as u64)?;
            (rule, Some(cc.unit).filter(|u| !u.is_empty()))
        } else {
            (ConversionRule::Identity, None)
        };

        let comment = match reader.read_text(block.comment_addr as u64)? {
            Some(c) if !c.is_empty() => Some(c),
            _ => Some(block.description.clone()).filter(|d| !d.is_empty()),
        };
        log::debug!("channel {name:?} at {position:#x}");

        Ok(Some(Self {
            name,
            unit,
            comment,
            layout: ChannelLayout {
                byte_offset: block.byte_offset(),
                bit_offset: block.bit_offset(),
                bit_count,
                kind,
                byte_order: order.unwrap_or(default_order),
            },
            role: if block.is_master() {
                ChannelRole::Master
            } else {
                ChannelRole::Data
            },
            conversion,
            validity: ChannelValidity::AlwaysValid,
        }))
    }
}

fn v4_kind(data_type: DataType) -> Option<(ValueKind, ByteOrder)> {
    use ByteOrder::{BigEndian as BE, LittleEndian as LE};
    Some(match data_type {
        DataType::UnsignedIntegerLE => (ValueKind::Unsigned, LE),
        DataType::UnsignedIntegerBE => (ValueKind::Unsigned, BE),
        DataType::SignedIntegerLE => (ValueKind::Signed, LE),
        DataType::SignedIntegerBE => (ValueKind::Signed, BE),
        DataType::FloatLE => (ValueKind::Float, LE),
        DataType::FloatBE => (ValueKind::Float, BE),
        DataType::StringLatin1 => (ValueKind::String(TextEncoding::Latin1), LE),
        DataType::StringUtf8 => (ValueKind::String(TextEncoding::Utf8), LE),
        DataType::StringUtf16LE => (ValueKind::String(TextEncoding::Utf16(LE)), LE),
        DataType::StringUtf16BE => (ValueKind::String(TextEncoding::Utf16(BE)), BE),
        DataType::ByteArray
        | DataType::MimeSample
        | DataType::MimeStream
        | DataType::CanOpenDate
        | DataType::CanOpenTime => (ValueKind::ByteArray, LE),
        DataType::ComplexLE | DataType::ComplexBE | DataType::Unknown(_) => return None,
    })
}
