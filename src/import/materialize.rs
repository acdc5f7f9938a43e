//! Channels decoded during import and stored as explicit values.

use super::relocate::GroupRecords;
use crate::{
    Error, Result,
    conversion::{ConversionRule, RuleOutput},
    external::push_value,
    model::{Flag, Sequence},
    parsing::{
        ChannelValidity, RawChannel, TextEncoding, ValueKind,
        decoder::{decode_fixed_string, decode_unsigned},
    },
    types::{ByteOrder, RawValue, StringEncoding},
};

/// Decode text up to the first NUL character.
pub(super) fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Latin1 => decode_fixed_string(bytes, bytes.len(), StringEncoding::Latin1),
        TextEncoding::Utf8 => decode_fixed_string(bytes, bytes.len(), StringEncoding::Utf8),
        TextEncoding::Utf16(order) => {
            let units = bytes
                .chunks_exact(2)
                .map(|pair| match order {
                    ByteOrder::LittleEndian => u16::from_le_bytes([pair[0], pair[1]]),
                    ByteOrder::BigEndian => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .take_while(|unit| *unit != 0);
            Ok(char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect())
        }
    }
}

pub(super) fn record_flag(record: &[u8], validity: ChannelValidity, data_offset: u64) -> Flag {
    match validity {
        ChannelValidity::AlwaysValid => Flag::VALID,
        ChannelValidity::AllInvalid => Flag::INVALID,
        ChannelValidity::Bit(bit) => {
            let byte = record.get((data_offset + bit.byte_offset as u64) as usize);
            match byte {
                Some(b) if b >> bit.bit & 1 == 1 => Flag::INVALID,
                _ => Flag::VALID,
            }
        }
    }
}

fn field<'a>(record: &'a [u8], at: usize, len: usize, channel: &str) -> Result<&'a [u8]> {
    let end = at.checked_add(len).unwrap_or(usize::MAX);
    record.get(at..end).ok_or_else(|| {
        Error::CorruptFile(format!(
            "channel {channel:?} reaches past its {} byte record",
            record.len()
        ))
    })
}

fn text_or_bytes(bytes: &[u8], kind: ValueKind, channel: &str) -> Result<RawValue> {
    match kind {
        ValueKind::String(encoding) => Ok(RawValue::String(decode_text(bytes, encoding)?)),
        ValueKind::ByteArray => Ok(RawValue::ByteArray(bytes.to_vec())),
        other => Err(Error::UnsupportedDataType(format!(
            "{other:?} values of channel {channel:?} cannot be materialized"
        ))),
    }
}

fn empty_for(kind: ValueKind, rows: usize) -> Sequence {
    match kind {
        ValueKind::ByteArray => Sequence::ByteStr(Vec::with_capacity(rows)),
        _ => Sequence::String(Vec::with_capacity(rows)),
    }
}

/// Fixed-length text or byte fields read straight from the records.
pub(super) fn fixed_values(
    records: &[u8],
    group: &GroupRecords,
    channel: &RawChannel,
    rows: usize,
) -> Result<(Sequence, Vec<Flag>)> {
    let layout = &channel.layout;
    let at = (group.data_offset + layout.byte_offset as u64) as usize;
    let mut values = empty_for(layout.kind, rows);
    let mut flags = Vec::with_capacity(rows);
    for record in records.chunks_exact(group.record_size as usize).take(rows) {
        let bytes = field(record, at, layout.byte_len(), &channel.name)?;
        push_value(&mut values, text_or_bytes(bytes, layout.kind, &channel.name)?)?;
        flags.push(record_flag(record, channel.validity, group.data_offset));
    }
    Ok((values, flags))
}

/// Variable-length values: each record holds an offset into `stream`, where
/// a `u32` length precedes the value bytes.
pub(super) fn vlsd_values(
    records: &[u8],
    group: &GroupRecords,
    channel: &RawChannel,
    rows: usize,
    stream: &[u8],
) -> Result<(Sequence, Vec<Flag>)> {
    let layout = &channel.layout;
    let at = (group.data_offset + layout.byte_offset as u64) as usize;
    let offset_bits = layout.bit_count.min(64);
    let mut values = empty_for(layout.kind, rows);
    let mut flags = Vec::with_capacity(rows);
    for record in records.chunks_exact(group.record_size as usize).take(rows) {
        let bytes = field(record, at, layout.byte_len(), &channel.name)?;
        let offset = decode_unsigned(bytes, layout.bit_offset as u32, offset_bits, layout.byte_order)?
            as usize;
        let truncated = || {
            Error::CorruptFile(format!(
                "signal data of {:?} at offset {offset} is truncated",
                channel.name
            ))
        };
        let start = offset.checked_add(4).ok_or_else(truncated)?;
        let len = stream
            .get(offset..start)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
            .ok_or_else(truncated)?;
        let end = start.checked_add(len).ok_or_else(truncated)?;
        let value = stream.get(start..end).ok_or_else(truncated)?;
        push_value(&mut values, text_or_bytes(value, layout.kind, &channel.name)?)?;
        flags.push(record_flag(record, channel.validity, group.data_offset));
    }
    Ok((values, flags))
}

/// Values of a virtual channel whose rule is not linear: the rule applied
/// to the record index.
pub(super) fn virtual_values(rule: &ConversionRule, rows: usize) -> Result<Sequence> {
    let mut values = match rule.output() {
        RuleOutput::Text => Sequence::String(Vec::with_capacity(rows)),
        RuleOutput::Raw | RuleOutput::Numeric => Sequence::Double(Vec::with_capacity(rows)),
    };
    for index in 0..rows as u64 {
        push_value(&mut values, rule.apply(&RawValue::UnsignedInteger(index)))?;
    }
    Ok(values)
}
