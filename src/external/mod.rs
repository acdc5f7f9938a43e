//! Column decode engine.
//!
//! A local column either carries its values in the model or points at raw
//! bytes in external files through [`ExternalComponent`] descriptors. The
//! engine turns either form into a flat sequence of `(value, flag)` pairs
//! whose length equals the row count of the owning SubMatrix.
//!
//! Columns are decoded independently: each decode opens its own file
//! handles, so a failure in one column never affects its siblings.

mod column;
mod component;

pub use column::{CONVERSION_RULE, LocalColumn, SequenceRepresentation};
pub use component::{
    ExternalComponent, INVALIDATION_BIT, INVALIDATION_BYTE_OFFSET, InvalidationLocation, RawKind,
    TypeSpec,
};

use crate::{
    Error, Result,
    conversion::{ConversionRule, RuleOutput},
    model::{DataType, Flag, InstanceRef, Model, Sequence, Validity, Value},
    parsing::{
        decoder::{
            decode_f32, decode_f64, decode_fixed_string, decode_float_bits, decode_signed,
            decode_unsigned,
        },
        reader::{ByteRangeReader, FileRangeReader},
    },
    types::{RawValue, StringEncoding},
};
use log::debug;
use std::path::PathBuf;

/// Upper bound for one read request while walking a component.
const CHUNK_BYTES: u64 = 1 << 20;

/// Decoded values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Materialized { values: Sequence, flags: Validity },
    /// `offset + i * factor`, every value valid. Nothing is allocated.
    ImplicitLinear { offset: f64, factor: f64, len: usize },
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Materialized { values, .. } => values.len(),
            ColumnValues::ImplicitLinear { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flag(&self, index: usize) -> Flag {
        match self {
            ColumnValues::Materialized { flags, .. } => flags.flag(index),
            ColumnValues::ImplicitLinear { .. } => Flag::VALID,
        }
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            ColumnValues::Materialized { values, .. } => values.get_f64(index),
            ColumnValues::ImplicitLinear {
                offset,
                factor,
                len,
            } => (index < *len).then(|| offset + index as f64 * factor),
        }
    }

    /// Value and flag of row `index`.
    pub fn get(&self, index: usize) -> Option<(Value, Flag)> {
        let value = match self {
            ColumnValues::Materialized { values, .. } => values.get(index)?,
            ColumnValues::ImplicitLinear { .. } => Value::Double(self.get_f64(index)?),
        };
        Some((value, self.flag(index)))
    }

    /// Materialize the values, expanding implicit columns.
    pub fn into_sequence(self) -> Sequence {
        match self {
            ColumnValues::Materialized { values, .. } => values,
            ColumnValues::ImplicitLinear {
                offset,
                factor,
                len,
            } => Sequence::Double((0..len).map(|i| offset + i as f64 * factor).collect()),
        }
    }
}

/// Scalar datatype of the values stored with type `value_type`.
pub fn raw_data_type(value_type: TypeSpec, bits: u32) -> Result<DataType> {
    Ok(match value_type.kind() {
        RawKind::Boolean => DataType::Boolean,
        RawKind::Unsigned => match bits {
            0..=8 => DataType::Byte,
            9..=15 => DataType::Short,
            16..=31 => DataType::Long,
            32..=63 => DataType::LongLong,
            _ => DataType::Double,
        },
        RawKind::Signed => match bits {
            0..=16 => DataType::Short,
            17..=32 => DataType::Long,
            _ => DataType::LongLong,
        },
        RawKind::Float if bits <= 32 => DataType::Float,
        RawKind::Float => DataType::Double,
        RawKind::Latin1 | RawKind::Utf8 => DataType::String,
        RawKind::Bytes => DataType::ByteStr,
        RawKind::Unsupported => {
            return Err(Error::UnsupportedDataType(format!("{value_type:?}")));
        }
    })
}

/// Scalar datatype a column decodes to once `rule` is applied.
pub fn column_data_type(value_type: TypeSpec, bits: u32, rule: &ConversionRule) -> Result<DataType> {
    match rule.output() {
        RuleOutput::Raw => raw_data_type(value_type, bits),
        RuleOutput::Numeric => Ok(DataType::Double),
        RuleOutput::Text => Ok(DataType::String),
    }
}

/// Empty sequence holding values of the scalar type `data_type`.
pub fn empty_sequence(data_type: DataType, capacity: usize) -> Result<Sequence> {
    Ok(match data_type {
        DataType::String => Sequence::String(Vec::with_capacity(capacity)),
        DataType::Short => Sequence::Short(Vec::with_capacity(capacity)),
        DataType::Float => Sequence::Float(Vec::with_capacity(capacity)),
        DataType::Boolean => Sequence::Boolean(Vec::with_capacity(capacity)),
        DataType::Byte => Sequence::Byte(Vec::with_capacity(capacity)),
        DataType::Long => Sequence::Long(Vec::with_capacity(capacity)),
        DataType::Double => Sequence::Double(Vec::with_capacity(capacity)),
        DataType::LongLong => Sequence::LongLong(Vec::with_capacity(capacity)),
        DataType::Date => Sequence::Date(Vec::with_capacity(capacity)),
        DataType::ByteStr => Sequence::ByteStr(Vec::with_capacity(capacity)),
        DataType::Enum => Sequence::Enum(Vec::with_capacity(capacity)),
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "no sequence of {other}"
            )));
        }
    })
}

/// Append a decoded value, narrowing it to the sequence's element type.
pub fn push_value(sequence: &mut Sequence, value: RawValue) -> Result<()> {
    match (sequence, value) {
        (Sequence::Double(v), value) if value.as_f64().is_some() => {
            v.extend(value.as_f64());
        }
        (Sequence::Float(v), RawValue::Float(x)) => v.push(x as f32),
        (Sequence::Boolean(v), value) if value.is_integer() => {
            v.push(value.as_f64().is_some_and(|x| x != 0.0));
        }
        (Sequence::Byte(v), RawValue::UnsignedInteger(x)) => v.push(x as u8),
        (Sequence::Short(v), RawValue::UnsignedInteger(x)) => v.push(x as i16),
        (Sequence::Short(v), RawValue::SignedInteger(x)) => v.push(x as i16),
        (Sequence::Long(v), RawValue::UnsignedInteger(x)) => v.push(x as i32),
        (Sequence::Long(v), RawValue::SignedInteger(x)) => v.push(x as i32),
        (Sequence::LongLong(v), RawValue::UnsignedInteger(x)) => v.push(x as i64),
        (Sequence::LongLong(v), RawValue::SignedInteger(x)) => v.push(x),
        (Sequence::String(v), RawValue::String(s)) => v.push(s),
        (Sequence::String(v), RawValue::Float(x)) => v.push(x.to_string()),
        (Sequence::String(v), RawValue::UnsignedInteger(x)) => v.push(x.to_string()),
        (Sequence::String(v), RawValue::SignedInteger(x)) => v.push(x.to_string()),
        (Sequence::ByteStr(v), RawValue::ByteArray(b)) => v.push(b),
        (sequence, value) => {
            return Err(Error::MalformedValue(format!(
                "cannot store {value:?} in a {} column",
                sequence.data_type()
            )));
        }
    }
    Ok(())
}

/// Decode one raw value located at the start of `bytes`.
fn decode_value(bytes: &[u8], component: &ExternalComponent, bits: u32) -> Result<RawValue> {
    let value_type = component.value_type;
    let order = value_type.byte_order();
    let bit_offset = if value_type.is_bit_field() {
        component.bit_offset as u32
    } else {
        0
    };
    Ok(match value_type.kind() {
        RawKind::Boolean | RawKind::Unsigned => {
            RawValue::UnsignedInteger(decode_unsigned(bytes, bit_offset, bits, order)?)
        }
        RawKind::Signed => RawValue::SignedInteger(decode_signed(bytes, bit_offset, bits, order)?),
        RawKind::Float if value_type.is_bit_field() => {
            RawValue::Float(decode_float_bits(bytes, bit_offset, bits, order)?)
        }
        RawKind::Float if bits == 32 => RawValue::Float(decode_f32(bytes, order)? as f64),
        RawKind::Float => RawValue::Float(decode_f64(bytes, order)?),
        RawKind::Latin1 => RawValue::String(decode_fixed_string(
            bytes,
            (bits / 8) as usize,
            StringEncoding::Latin1,
        )?),
        RawKind::Utf8 => RawValue::String(decode_fixed_string(
            bytes,
            (bits / 8) as usize,
            StringEncoding::Utf8,
        )?),
        RawKind::Bytes => {
            let len = (bits / 8) as usize;
            let field = bytes.get(..len).ok_or_else(|| {
                Error::MalformedValue(format!("{len} byte field, {} available", bytes.len()))
            })?;
            RawValue::ByteArray(field.to_vec())
        }
        RawKind::Unsupported => {
            return Err(Error::UnsupportedDataType(format!("{value_type:?}")));
        }
    })
}

/// Per-column cache of open component files.
#[derive(Default)]
struct Files {
    open: Vec<(PathBuf, FileRangeReader)>,
}

impl Files {
    fn get(&mut self, path: &PathBuf) -> Result<&mut FileRangeReader> {
        let index = match self.open.iter().position(|(p, _)| p == path) {
            Some(index) => index,
            None => {
                self.open.push((path.clone(), FileRangeReader::new(path)?));
                self.open.len() - 1
            }
        };
        Ok(&mut self.open[index].1)
    }
}

struct Sink<'a> {
    rule: &'a ConversionRule,
    global_flag: Flag,
    values: Sequence,
    /// Only tracked when some fragment carries invalidation bits.
    flags: Option<Vec<Flag>>,
}

fn decode_component(
    reader: &mut impl ByteRangeReader,
    component: &ExternalComponent,
    sink: &mut Sink<'_>,
) -> Result<()> {
    if component.value_type.kind() == RawKind::Unsupported {
        return Err(Error::UnsupportedDataType(format!(
            "{:?} in {}",
            component.value_type,
            component.filename.display()
        )));
    }
    if component.length == 0 {
        return Ok(());
    }
    let end = component.end_position()?;
    if end > reader.size() {
        return Err(Error::CorruptFile(format!(
            "component {} addresses byte {end} of {}, which has {} bytes",
            component.ordinal,
            component.filename.display(),
            reader.size()
        )));
    }

    let bits = component.value_bits()?;
    let size = component.value_size()?;
    let vpb = component.values_per_block;
    let blocks = component.length.div_ceil(vpb);
    let blocks_per_chunk = (CHUNK_BYTES / component.block_size.max(1)).max(1);

    let mut block = 0;
    while block < blocks {
        let last_block = (block + blocks_per_chunk).min(blocks);
        let first_index = block * vpb;
        let last_index = (last_block * vpb).min(component.length) - 1;
        let chunk_start = component.start_offset + block * component.block_size;
        let mut chunk_end = component.position(last_index)? + size;
        if let Some(inval) = component.invalidation {
            let byte = component.start_offset
                + (last_block - 1) * component.block_size
                + inval.byte_offset;
            chunk_end = chunk_end.max(byte + 1);
        }
        let bytes = reader.read_range(chunk_start, chunk_end - chunk_start)?;

        for index in first_index..=last_index {
            let at = (component.position(index)? - chunk_start) as usize;
            let raw = decode_value(&bytes[at..], component, bits)?;
            let value = if sink.rule.is_identity() {
                raw
            } else {
                sink.rule.apply(&raw)
            };
            push_value(&mut sink.values, value)?;

            if let Some(flags) = sink.flags.as_mut() {
                let flag = match component.invalidation {
                    Some(inval) => {
                        let byte = component.start_offset
                            + (index / vpb) * component.block_size
                            + inval.byte_offset
                            - chunk_start;
                        if bytes[byte as usize] >> inval.bit & 1 == 1 {
                            Flag::INVALID
                        } else {
                            sink.global_flag
                        }
                    }
                    None => sink.global_flag,
                };
                flags.push(flag);
            }
        }
        block = last_block;
    }
    Ok(())
}

fn decode_external(column: &LocalColumn) -> Result<ColumnValues> {
    let linear;
    let rule = match column.representation {
        SequenceRepresentation::RawLinearExternal => {
            let (offset, factor) = column.linear_parameters()?;
            linear = ConversionRule::Linear { offset, factor };
            &linear
        }
        _ => &column.conversion,
    };
    let data_type = match column.components.first() {
        Some(first) => column_data_type(first.value_type, first.value_bits()?, rule)?,
        None => DataType::Double,
    };

    let mut sink = Sink {
        rule,
        global_flag: column.global_flag,
        values: empty_sequence(data_type, column.rows as usize)?,
        flags: column
            .components
            .iter()
            .any(|c| c.invalidation.is_some())
            .then(|| Vec::with_capacity(column.rows as usize)),
    };
    let mut files = Files::default();
    for component in &column.components {
        decode_component(files.get(&component.filename)?, component, &mut sink)?;
    }

    let flags = match sink.flags {
        Some(flags) => Validity::PerElement(flags),
        None => Validity::Scalar(column.global_flag),
    };
    Ok(ColumnValues::Materialized {
        values: sink.values,
        flags,
    })
}

/// Decode the values of one `AoLocalColumn` instance.
///
/// The result always holds exactly as many values as the owning SubMatrix
/// declares rows; any other count is reported as [`Error::CorruptFile`].
pub fn decode_column(model: &Model, column: InstanceRef) -> Result<ColumnValues> {
    let column = LocalColumn::load(model, column)?;
    let expected = column.rows as usize;

    let decoded = match column.representation {
        SequenceRepresentation::Explicit => {
            let (values, flags) = column.explicit.clone().ok_or_else(|| {
                Error::MalformedValue(format!("explicit column {} has no values", column.name))
            })?;
            ColumnValues::Materialized { values, flags }
        }
        SequenceRepresentation::RawLinear => {
            let (offset, factor) = column.linear_parameters()?;
            let (raw, flags) = column.explicit.clone().ok_or_else(|| {
                Error::MalformedValue(format!("raw_linear column {} has no values", column.name))
            })?;
            let values = (0..raw.len())
                .map(|i| {
                    raw.get_f64(i).map(|x| offset + factor * x).ok_or_else(|| {
                        Error::MalformedValue(format!("non-numeric raw value in {}", column.name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ColumnValues::Materialized {
                values: Sequence::Double(values),
                flags,
            }
        }
        SequenceRepresentation::ImplicitConstant => {
            let constant = column.generation_parameters.first().copied().ok_or_else(|| {
                Error::MalformedValue(format!("implicit_constant column {} has no value", column.name))
            })?;
            ColumnValues::ImplicitLinear {
                offset: constant,
                factor: 0.0,
                len: expected,
            }
        }
        SequenceRepresentation::ImplicitLinear => {
            let (offset, factor) = column.linear_parameters()?;
            ColumnValues::ImplicitLinear {
                offset,
                factor,
                len: expected,
            }
        }
        SequenceRepresentation::ExternalComponent | SequenceRepresentation::RawLinearExternal => {
            decode_external(&column)?
        }
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "sequence representation {other:?} of {}",
                column.name
            )));
        }
    };

    if decoded.len() != expected {
        return Err(Error::CorruptFile(format!(
            "column {} decoded {} values, its submatrix has {expected} rows",
            column.name,
            decoded.len()
        )));
    }
    debug!(
        "decoded {} values of column {} ({:?})",
        expected, column.name, column.representation
    );
    Ok(decoded)
}

/// Decode every local column of a SubMatrix.
///
/// Each column gets its own result. With the `parallel` feature the
/// columns are decoded on the rayon thread pool.
pub fn decode_columns(
    model: &Model,
    submatrix: InstanceRef,
) -> Result<Vec<(InstanceRef, Result<ColumnValues>)>> {
    let columns = model.related_by_base(submatrix, "local_columns")?;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        Ok(columns
            .into_par_iter()
            .map(|c| (c, decode_column(model, c)))
            .collect())
    }

    #[cfg(not(feature = "parallel"))]
    {
        Ok(columns
            .into_iter()
            .map(|c| (c, decode_column(model, c)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::io::Write;

    struct Fixture {
        model: Model,
        submatrix: InstanceRef,
        column_element: crate::model::ElementId,
        component_element: crate::model::ElementId,
    }

    fn fixture(rows: i32) -> Fixture {
        let mut model = Model::new("asam35").unwrap();
        let sm = model.create_application_element("SubMatrix", "AoSubMatrix").unwrap();
        let lc = model.create_application_element("LocalColumn", "AoLocalColumn").unwrap();
        let ec = model
            .create_application_element("ExternalComponent", "AoExternalComponent")
            .unwrap();
        model.add_base_attribute(lc, "generation_parameters").unwrap();
        model.add_base_attribute(ec, "ao_bit_offset").unwrap();
        model.add_base_attribute(ec, "ao_bit_count").unwrap();
        model
            .create_attribute(ec, INVALIDATION_BYTE_OFFSET, DataType::LongLong, None)
            .unwrap();
        model
            .create_attribute(ec, INVALIDATION_BIT, DataType::Short, None)
            .unwrap();
        model
            .create_attribute(lc, CONVERSION_RULE, DataType::String, None)
            .unwrap();
        let submatrix = model.create_instance(sm, "group").unwrap();
        model.set(submatrix, "number_of_rows", Value::Long(rows)).unwrap();
        Fixture {
            model,
            submatrix,
            column_element: lc,
            component_element: ec,
        }
    }

    impl Fixture {
        fn column(&mut self, name: &str, representation: SequenceRepresentation) -> InstanceRef {
            let column = self.model.create_instance(self.column_element, name).unwrap();
            self.model
                .set(
                    column,
                    "sequence_representation",
                    Value::Enum(representation.code()),
                )
                .unwrap();
            self.model.set(column, "global_flag", Value::Short(15)).unwrap();
            self.model
                .create_relation(column, "submatrix", self.submatrix)
                .unwrap();
            column
        }

        #[allow(clippy::too_many_arguments)]
        fn component(
            &mut self,
            column: InstanceRef,
            path: &std::path::Path,
            ordinal: i32,
            start: i64,
            length: i32,
            block_size: i32,
            value_offset: i32,
            value_type: TypeSpec,
        ) -> InstanceRef {
            let c = self
                .model
                .create_instance(self.component_element, &format!("fragment {ordinal}"))
                .unwrap();
            let m = &mut self.model;
            m.set(c, "ordinal_number", Value::Long(ordinal)).unwrap();
            m.set(c, "filename_url", Value::String(path.display().to_string()))
                .unwrap();
            m.set(c, "start_offset", Value::LongLong(start)).unwrap();
            m.set(c, "component_length", Value::Long(length)).unwrap();
            m.set(c, "block_size", Value::Long(block_size)).unwrap();
            m.set(c, "valuesperblock", Value::Long(1)).unwrap();
            m.set(c, "value_offset", Value::Long(value_offset)).unwrap();
            m.set(c, "value_type", Value::Enum(value_type.code())).unwrap();
            m.create_relation(column, "external_component", c).unwrap();
            c
        }
    }

    fn data_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn implicit_linear_is_lazy() {
        let mut f = fixture(5);
        let time = f.column("time", SequenceRepresentation::ImplicitLinear);
        f.model
            .set(
                time,
                "generation_parameters",
                Value::Sequence(Sequence::Double(vec![1.0, 0.5])),
            )
            .unwrap();
        let values = decode_column(&f.model, time).unwrap();
        assert_eq!(
            values,
            ColumnValues::ImplicitLinear {
                offset: 1.0,
                factor: 0.5,
                len: 5
            }
        );
        assert_eq!(values.get_f64(4), Some(3.0));
        assert_eq!(values.get_f64(5), None);
        assert_eq!(values.flag(2), Flag::VALID);
    }

    #[test]
    fn explicit_length_must_match_rows() {
        let mut f = fixture(3);
        let col = f.column("text", SequenceRepresentation::Explicit);
        f.model
            .set(
                col,
                "values",
                Value::Sequence(Sequence::String(vec!["a".into(), "b".into()])),
            )
            .unwrap();
        let err = decode_column(&f.model, col).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptFile);
    }

    #[test]
    fn strided_fragments_concatenate_in_ordinal_order() {
        // records of 4 bytes: [u16 value][u8 pad][u8 invalidation]
        let mut bytes = Vec::new();
        for i in 0u16..6 {
            bytes.extend_from_slice(&(i * 10).to_le_bytes());
            bytes.push(0xEE);
            bytes.push(u8::from(i == 4));
        }
        let file = data_file(&bytes);
        let mut f = fixture(6);
        let col = f.column("speed", SequenceRepresentation::ExternalComponent);
        f.model
            .set(
                col,
                CONVERSION_RULE,
                Value::String(
                    ConversionRule::Linear {
                        offset: 1.0,
                        factor: 0.5,
                    }
                    .to_json()
                    .unwrap(),
                ),
            )
            .unwrap();
        // second fragment created first: ordinals decide the order
        let second = f.component(col, file.path(), 2, 8, 4, 4, 0, TypeSpec::UShort);
        f.component(col, file.path(), 1, 0, 2, 4, 0, TypeSpec::UShort);
        f.model
            .set(second, INVALIDATION_BYTE_OFFSET, Value::LongLong(3))
            .unwrap();
        f.model.set(second, INVALIDATION_BIT, Value::Short(0)).unwrap();

        let values = decode_column(&f.model, col).unwrap();
        let expected: Vec<f64> = (0..6).map(|i| 1.0 + 0.5 * (i * 10) as f64).collect();
        assert_eq!(values.clone().into_sequence(), Sequence::Double(expected));
        assert!(values.flag(3).is_valid());
        assert!(!values.flag(4).is_valid());

        // decoding twice yields identical results
        assert_eq!(decode_column(&f.model, col).unwrap(), values);
    }

    #[test]
    fn bit_packed_values() {
        let file = data_file(&[0xAB, 0xCD, 0xEF]);
        let mut f = fixture(1);
        let col = f.column("packed", SequenceRepresentation::ExternalComponent);
        let c = f.component(col, file.path(), 1, 0, 1, 3, 0, TypeSpec::BitInt);
        f.model.set(c, "ao_bit_offset", Value::Short(6)).unwrap();
        f.model.set(c, "ao_bit_count", Value::Short(14)).unwrap();
        let values = decode_column(&f.model, col).unwrap();
        assert_eq!(values.into_sequence(), Sequence::Short(vec![-202]));
    }

    #[test]
    fn out_of_range_and_missing_files_are_column_scoped() {
        let file = data_file(&[0u8; 8]);
        let mut f = fixture(4);
        let good = f.column("good", SequenceRepresentation::ExternalComponent);
        f.component(good, file.path(), 1, 0, 4, 2, 0, TypeSpec::Short);
        let short = f.column("short", SequenceRepresentation::ExternalComponent);
        f.component(short, file.path(), 1, 0, 4, 4, 0, TypeSpec::Long);
        let gone = f.column("gone", SequenceRepresentation::ExternalComponent);
        let missing = file.path().with_extension("missing");
        f.component(gone, &missing, 1, 0, 4, 2, 0, TypeSpec::Short);

        let results = decode_columns(&f.model, f.submatrix).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.as_ref().unwrap().len(), 4);
        assert_eq!(
            results[1].1.as_ref().unwrap_err().kind(),
            ErrorKind::CorruptFile
        );
        assert_eq!(
            results[2].1.as_ref().unwrap_err().kind(),
            ErrorKind::FileNotFound
        );
    }

    #[test]
    fn unsupported_raw_type() {
        let file = data_file(&[0u8; 8]);
        let mut f = fixture(1);
        let col = f.column("blob", SequenceRepresentation::ExternalComponent);
        f.component(col, file.path(), 1, 0, 1, 8, 0, TypeSpec::Blob);
        let err = decode_column(&f.model, col).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedDataType);
    }

    #[test]
    fn push_value_narrows() {
        let mut seq = empty_sequence(DataType::Short, 2).unwrap();
        push_value(&mut seq, RawValue::SignedInteger(-5)).unwrap();
        push_value(&mut seq, RawValue::UnsignedInteger(7)).unwrap();
        assert_eq!(seq, Sequence::Short(vec![-5, 7]));
        assert!(push_value(&mut seq, RawValue::String("x".into())).is_err());
        assert_eq!(
            raw_data_type(TypeSpec::BitUint, 64).unwrap(),
            DataType::Double
        );
        assert_eq!(raw_data_type(TypeSpec::UShort, 16).unwrap(), DataType::Long);
    }
}
