//! MDF-to-model writer.
//!
//! Importing a file creates one Test (reused by name) and one Measurement.
//! Every channel group becomes a SubMatrix and every channel a MeaQuantity
//! with one LocalColumn. Stored channels are addressed in place through
//! ExternalComponent instances, one per run of records; records that are
//! compressed, interleaved with other groups or split across data list
//! fragments are copied into a binary store first.
//!
//! An import either completes or leaves the model as it found it: every
//! instance it created is removed and the binary store is rolled back.

mod layout;
mod materialize;
mod relocate;
mod schema;

pub use layout::{Placement, placement};
pub use schema::Schema;

use crate::{
    Error, Result,
    conversion::ConversionRule,
    external::{
        CONVERSION_RULE, INVALIDATION_BIT, INVALIDATION_BYTE_OFFSET, SequenceRepresentation,
        TypeSpec, column_data_type,
    },
    model::{DataType, Flag, InstanceRef, Model, Sequence, Validity, Value},
    options::ImportOptions,
    parsing::{
        BlockReader, ChannelRole, ChannelValidity, MdfFile, ParseStatus, RawChannel,
        RawChannelGroup, RawDataGroup, ValueKind, discover_v4, read_fragments,
        reader::{BufferedRangeReader, ByteRangeReader},
    },
};
use chrono::DateTime;
use log::{debug, info, warn};
use relocate::{DataGroupRecords, GroupRecords, StoreSlot};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// What an import added to the model.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub test: InstanceRef,
    pub measurement: InstanceRef,
    pub submatrices: Vec<InstanceRef>,
    pub status: ParseStatus,
    /// Binary store holding relocated records, if any were needed.
    pub store: Option<PathBuf>,
}

/// ODS date string (`YYYYMMDDhhmmss`) of a Unix timestamp in nanoseconds.
pub fn ods_date(unix_ns: u64) -> Option<String> {
    let seconds = i64::try_from(unix_ns / 1_000_000_000).ok()?;
    let nanos = (unix_ns % 1_000_000_000) as u32;
    DateTime::from_timestamp(seconds, nanos).map(|t| t.format("%Y%m%d%H%M%S").to_string())
}

fn long(value: u64, what: &str) -> Result<Value> {
    i32::try_from(value)
        .map(Value::Long)
        .map_err(|_| Error::MalformedValue(format!("{what} {value} exceeds the DT_LONG range")))
}

fn store_path(source: &Path, options: &ImportOptions) -> PathBuf {
    let mut name = source.file_name().unwrap_or_default().to_os_string();
    name.push(".bin");
    match &options.store_dir {
        Some(dir) => dir.join(name),
        None => source.with_file_name(name),
    }
}

/// Import the MDF file at `path` into `model`.
pub fn import_file(
    model: &mut Model,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let path = path.as_ref();
    let source = std::path::absolute(path)?;
    let mut reader = BufferedRangeReader::new(&source)?;
    let file = MdfFile::parse(&mut reader, options)?;

    let schema = Schema::ensure(model)?;
    let mut writer = ModelWriter {
        model,
        schema,
        options,
        store: StoreSlot::new(store_path(&source, options)),
        journal: Vec::new(),
        source,
    };
    let result = writer
        .write(&file, &mut reader)
        .and_then(|summary| writer.store.flush().map(|_| summary));
    match result {
        Ok(summary) => {
            info!(
                "imported {}: {} submatrices, {} instances{}",
                path.display(),
                summary.submatrices.len(),
                writer.journal.len(),
                if summary.status == ParseStatus::Incomplete {
                    " (incomplete)"
                } else {
                    ""
                }
            );
            Ok(summary)
        }
        Err(e) => {
            warn!("import of {} failed, rolling back: {e}", path.display());
            writer.rollback();
            Err(e)
        }
    }
}

/// Writes one parsed file into the model, journaling what it creates.
pub struct ModelWriter<'a> {
    model: &'a mut Model,
    schema: Schema,
    options: &'a ImportOptions,
    store: StoreSlot,
    journal: Vec<InstanceRef>,
    /// Absolute path of the source file.
    source: PathBuf,
}

/// Where a channel group's records are and how many rows it has.
struct GroupContext<'g> {
    submatrix: InstanceRef,
    measurement: InstanceRef,
    records: &'g GroupRecords,
    vlsd: &'g DataGroupRecords,
    rows: u64,
}

impl ModelWriter<'_> {
    fn create(&mut self, element: crate::model::ElementId, name: &str) -> Result<InstanceRef> {
        let instance = self.model.create_instance(element, name)?;
        self.journal.push(instance);
        Ok(instance)
    }

    fn rollback(&mut self) {
        for instance in self.journal.drain(..).rev() {
            if let Err(e) = self.model.remove_instance(instance) {
                warn!("rollback could not remove {instance:?}: {e}");
            }
        }
        if let Err(e) = self.store.rollback() {
            warn!("rollback of the binary store failed: {e}");
        }
    }

    fn find(&self, element: crate::model::ElementId, name: &str) -> Result<Option<InstanceRef>> {
        for instance in self.model.instances(element)? {
            if self.model.instance(instance)?.name == name {
                return Ok(Some(instance));
            }
        }
        Ok(None)
    }

    fn environment(&mut self) -> Result<InstanceRef> {
        if let Some(existing) = self.model.instances(self.schema.environment)?.next() {
            return Ok(existing);
        }
        let env = self.create(self.schema.environment, "mdf-ods")?;
        let version = self.model.base().version.clone();
        self.model
            .set_by_base(env, "base_model_version", Value::String(version))?;
        Ok(env)
    }

    fn test(&mut self, name: &str) -> Result<InstanceRef> {
        if let Some(existing) = self.find(self.schema.test, name)? {
            return Ok(existing);
        }
        self.create(self.schema.test, name)
    }

    fn write<R: ByteRangeReader + ?Sized>(
        &mut self,
        file: &MdfFile,
        reader: &mut R,
    ) -> Result<ImportSummary> {
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "measurement".to_string());

        self.environment()?;
        let test_name = self.options.test_name.clone().unwrap_or_else(|| stem.clone());
        let test = self.test(&test_name)?;
        let measurement = self.write_measurement(file, &stem, test)?;

        let mut blocks = BlockReader::new(reader, file.version);
        let mut submatrices = Vec::new();
        for (dg_index, dg) in file.data_groups.iter().enumerate() {
            let Some(located) =
                relocate::locate(&mut blocks, dg, &self.source, &mut self.store, self.options)?
            else {
                continue;
            };
            for (cg_index, (cg, records)) in
                dg.channel_groups.iter().zip(&located.groups).enumerate()
            {
                let Some(records) = records else {
                    continue;
                };
                let submatrix = self.write_channel_group(
                    &mut blocks,
                    measurement,
                    dg,
                    cg,
                    records,
                    &located,
                    format!("group {dg_index}.{cg_index}"),
                )?;
                submatrices.push(submatrix);
            }
        }

        Ok(ImportSummary {
            test,
            measurement,
            submatrices,
            status: file.status,
            store: self.store.used().map(Path::to_path_buf),
        })
    }

    fn write_measurement(
        &mut self,
        file: &MdfFile,
        name: &str,
        test: InstanceRef,
    ) -> Result<InstanceRef> {
        let measurement = self.create(self.schema.measurement, name)?;
        self.model.create_relation_by_base(measurement, "test", test)?;

        let header = &file.header;
        if let Some(text) = &header.comment.text {
            self.model
                .set_by_base(measurement, "description", Value::String(text.clone()))?;
        }
        if let Some(date) = header.start_time_ns.and_then(ods_date) {
            self.model
                .set_by_base(measurement, "measurement_begin", Value::Date(date))?;
        }
        for (key, value) in &header.comment.properties {
            let element = self.model.element(self.schema.measurement)?;
            match element.attribute(key) {
                Some(attr) if attr.base_name.is_some() || attr.data_type != DataType::String => {
                    warn!("header property {key:?} collides with attribute {:?}", attr.name);
                    continue;
                }
                Some(_) => {}
                None => {
                    self.model
                        .create_attribute(self.schema.measurement, key, DataType::String, None)?;
                }
            }
            self.model
                .set(measurement, key, Value::String(value.clone()))?;
        }
        Ok(measurement)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_channel_group<R: ByteRangeReader + ?Sized>(
        &mut self,
        blocks: &mut BlockReader<'_, R>,
        measurement: InstanceRef,
        dg: &RawDataGroup,
        cg: &RawChannelGroup,
        records: &GroupRecords,
        located: &DataGroupRecords,
        fallback_name: String,
    ) -> Result<InstanceRef> {
        let available = records.available();
        let rows = records.rows(cg.cycle_count);
        if rows != cg.cycle_count {
            warn!(
                "channel group {:?} declares {} records, {} are stored; using {rows}",
                cg.name, cg.cycle_count, available
            );
        }

        let name = cg.name.clone().unwrap_or(fallback_name);
        let submatrix = self.create(self.schema.submatrix, &name)?;
        self.model
            .set_by_base(submatrix, "number_of_rows", long(rows, "row count")?)?;
        if let Some(text) = cg.comment.as_ref().or(dg.comment.as_ref()) {
            self.model
                .set_by_base(submatrix, "description", Value::String(text.clone()))?;
        }
        self.model
            .create_relation_by_base(submatrix, "measurement", measurement)?;

        let context = GroupContext {
            submatrix,
            measurement,
            records,
            vlsd: located,
            rows,
        };
        for channel in &cg.channels {
            self.write_channel(blocks, &context, channel)?;
        }
        debug!("submatrix {name:?}: {} channels, {rows} rows", cg.channels.len());
        Ok(submatrix)
    }

    fn unit(&mut self, name: &str) -> Result<InstanceRef> {
        if let Some(existing) = self.find(self.schema.unit, name)? {
            return Ok(existing);
        }
        let unit = self.create(self.schema.unit, name)?;
        self.model.set_by_base(unit, "factor", Value::Double(1.0))?;
        self.model.set_by_base(unit, "offset", Value::Double(0.0))?;

        let dimension = match self.find(self.schema.phys_dimension, "unknown")? {
            Some(existing) => existing,
            None => {
                let dimension = self.create(self.schema.phys_dimension, "unknown")?;
                for exponent in [
                    "length_exp",
                    "mass_exp",
                    "time_exp",
                    "current_exp",
                    "temperature_exp",
                    "molar_amount_exp",
                    "luminous_intensity_exp",
                ] {
                    self.model.set_by_base(dimension, exponent, Value::Long(0))?;
                }
                dimension
            }
        };
        self.model
            .create_relation_by_base(unit, "phys_dimension", dimension)?;
        Ok(unit)
    }

    fn write_channel<R: ByteRangeReader + ?Sized>(
        &mut self,
        blocks: &mut BlockReader<'_, R>,
        group: &GroupContext<'_>,
        channel: &RawChannel,
    ) -> Result<()> {
        if matches!(channel.role, ChannelRole::VariableLength { .. })
            && !self.options.materialize_vlsd
        {
            debug!("skipping variable length channel {:?}", channel.name);
            return Ok(());
        }

        let quantity = self.create(self.schema.mea_quantity, &channel.name)?;
        self.model
            .create_relation_by_base(quantity, "measurement", group.measurement)?;
        if let Some(comment) = &channel.comment {
            self.model
                .set_by_base(quantity, "description", Value::String(comment.clone()))?;
        }
        if let Some(unit) = &channel.unit {
            let unit = self.unit(unit)?;
            self.model.create_relation_by_base(quantity, "unit", unit)?;
        }

        let column = self.create(self.schema.local_column, &channel.name)?;
        self.model
            .create_relation_by_base(column, "submatrix", group.submatrix)?;
        self.model
            .create_relation_by_base(column, "measurement_quantity", quantity)?;
        let global_flag = match channel.validity {
            ChannelValidity::AllInvalid => Flag::INVALID,
            _ => Flag::VALID,
        };
        self.model
            .set_by_base(column, "global_flag", Value::Short(global_flag.0 as i16))?;
        self.model.set_by_base(
            column,
            "independent",
            Value::Short(i16::from(channel.role.is_master())),
        )?;

        let data_type = match channel.role {
            ChannelRole::VirtualMaster | ChannelRole::VirtualData => {
                self.write_virtual(column, channel, group.rows)?
            }
            ChannelRole::VariableLength { signal_data } => {
                let stream = Self::signal_data(blocks, group.vlsd, signal_data)?;
                let records = group.records.load(blocks.source())?;
                let (values, flags) = materialize::vlsd_values(
                    &records,
                    group.records,
                    channel,
                    group.rows as usize,
                    &stream,
                )?;
                self.write_explicit(column, values, flags)?
            }
            ChannelRole::Master | ChannelRole::Data => match placement(&channel.layout) {
                Placement::External {
                    value_type,
                    bit_offset,
                    bit_count,
                } => self.write_external(
                    column,
                    channel,
                    group,
                    value_type,
                    bit_offset,
                    bit_count,
                )?,
                Placement::Materialize => {
                    let records = group.records.load(blocks.source())?;
                    let (values, flags) = materialize::fixed_values(
                        &records,
                        group.records,
                        channel,
                        group.rows as usize,
                    )?;
                    self.write_explicit(column, values, flags)?
                }
            },
        };
        self.model
            .set_by_base(quantity, "datatype", Value::Enum(data_type.code()))?;
        Ok(())
    }

    /// Signal data stream of a VLSD channel: a VLSD channel group of the
    /// same data group or a chain of signal data blocks.
    fn signal_data<'g, R: ByteRangeReader + ?Sized>(
        blocks: &mut BlockReader<'_, R>,
        located: &'g DataGroupRecords,
        address: u64,
    ) -> Result<Cow<'g, [u8]>> {
        if let Some(stream) = located.vlsd.get(&address) {
            return Ok(Cow::Borrowed(stream));
        }
        if address == 0 {
            return Ok(Cow::Owned(Vec::new()));
        }
        if blocks.read_header(address)?.id == "##CG" {
            return Err(Error::CorruptFile(format!(
                "signal data link {address:#x} names a channel group of another data group"
            )));
        }
        let fragments = discover_v4(blocks, address)?;
        Ok(Cow::Owned(read_fragments(blocks, &fragments)?))
    }

    fn write_explicit(
        &mut self,
        column: InstanceRef,
        values: Sequence,
        flags: Vec<Flag>,
    ) -> Result<DataType> {
        let data_type = match &values {
            Sequence::ByteStr(_) => DataType::ByteStr,
            Sequence::String(_) => DataType::String,
            _ => DataType::Double,
        };
        let validity = if flags.iter().all(Flag::is_valid) {
            Validity::Scalar(Flag::VALID)
        } else {
            Validity::PerElement(flags)
        };
        self.model.set_by_base(
            column,
            "sequence_representation",
            Value::Enum(SequenceRepresentation::Explicit.code()),
        )?;
        let attribute = self
            .model
            .element(column.element)?
            .attribute_by_base("values")
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "values".to_string());
        self.model
            .set_value(column, &attribute, Value::Sequence(values), validity)?;
        Ok(data_type)
    }

    fn write_virtual(
        &mut self,
        column: InstanceRef,
        channel: &RawChannel,
        rows: u64,
    ) -> Result<DataType> {
        let (offset, factor) = match channel.conversion {
            ConversionRule::Identity => (0.0, 1.0),
            ConversionRule::Linear { offset, factor } => (offset, factor),
            ref rule => {
                let values = materialize::virtual_values(rule, rows as usize)?;
                let flags = vec![Flag::VALID; values.len()];
                return self.write_explicit(column, values, flags);
            }
        };
        self.model.set_by_base(
            column,
            "sequence_representation",
            Value::Enum(SequenceRepresentation::ImplicitLinear.code()),
        )?;
        self.model.set_by_base(
            column,
            "generation_parameters",
            Value::Sequence(Sequence::Double(vec![offset, factor])),
        )?;
        Ok(DataType::Double)
    }

    fn write_external(
        &mut self,
        column: InstanceRef,
        channel: &RawChannel,
        group: &GroupContext<'_>,
        value_type: TypeSpec,
        bit_offset: u8,
        bit_count: Option<u16>,
    ) -> Result<DataType> {
        let records = group.records;
        let (representation, parameters, rule) = match &channel.conversion {
            ConversionRule::Identity => (SequenceRepresentation::ExternalComponent, None, None),
            ConversionRule::Linear { offset, factor } => (
                SequenceRepresentation::RawLinearExternal,
                Some(vec![*offset, *factor]),
                None,
            ),
            rule => (
                SequenceRepresentation::ExternalComponent,
                None,
                Some(rule.to_json()?),
            ),
        };
        self.model.set_by_base(
            column,
            "sequence_representation",
            Value::Enum(representation.code()),
        )?;
        if let Some(parameters) = parameters {
            self.model.set_by_base(
                column,
                "generation_parameters",
                Value::Sequence(Sequence::Double(parameters)),
            )?;
        }
        if let Some(rule) = rule {
            self.model.set(column, CONVERSION_RULE, Value::String(rule))?;
        }

        let value_offset = records.data_offset + channel.layout.byte_offset as u64;
        let mut remaining = group.rows;
        for (ordinal, run) in records.runs.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let count = run.records.min(remaining);
            remaining -= count;
            let ordinal = ordinal as u64 + 1;

            let component = self.create(
                self.schema.external_component,
                &format!("{} {ordinal}", channel.name),
            )?;
            let m = &mut *self.model;
            m.set_by_base(component, "ordinal_number", long(ordinal, "ordinal")?)?;
            m.set_by_base(component, "component_length", long(count, "component length")?)?;
            m.set_by_base(
                component,
                "filename_url",
                Value::String(run.file.display().to_string()),
            )?;
            m.set_by_base(component, "value_type", Value::Enum(value_type.code()))?;
            m.set_by_base(
                component,
                "start_offset",
                Value::LongLong(run.offset as i64),
            )?;
            m.set_by_base(component, "block_size", long(records.record_size, "block size")?)?;
            m.set_by_base(component, "valuesperblock", Value::Long(1))?;
            m.set_by_base(component, "value_offset", long(value_offset, "value offset")?)?;
            if bit_offset != 0 {
                m.set_by_base(component, "ao_bit_offset", Value::Short(bit_offset as i16))?;
            }
            if let Some(bits) = bit_count {
                m.set_by_base(component, "ao_bit_count", Value::Short(bits as i16))?;
            }
            if let ChannelValidity::Bit(bit) = channel.validity {
                m.set(
                    component,
                    INVALIDATION_BYTE_OFFSET,
                    Value::LongLong((records.data_offset + bit.byte_offset as u64) as i64),
                )?;
                m.set(component, INVALIDATION_BIT, Value::Short(bit.bit as i16))?;
            }
            m.create_relation_by_base(column, "external_component", component)?;
        }

        let bits = match value_type.fixed_size() {
            Some(size) => size * 8,
            None => bit_count.map_or(channel.layout.bit_count, u32::from),
        };
        if matches!(channel.layout.kind, ValueKind::String(_) | ValueKind::ByteArray)
            && !channel.conversion.is_identity()
        {
            debug!("conversion of text channel {:?} leaves values unchanged", channel.name);
        }
        column_data_type(value_type, bits, &channel.conversion)
    }
}
