use super::{
    BlockReader, MajorVersion, RawChannelGroup, RawDataGroup,
    metadata::{CommentMetadata, parse_comment},
    raw_channel_group::visit,
    raw_data_group::{DataFragment, discover_v4},
    reader::{BufferedRangeReader, ByteRangeReader},
};
use crate::{
    Result,
    blocks::{
        ChannelGroupBlock, DataGroupBlock, HeaderBlock, IdentificationBlock, v3,
    },
    options::ImportOptions,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;
use std::path::Path;

/// Whether the walk reached the end of the data group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Complete,
    /// Stopped early through an [`AbortHandle`](crate::AbortHandle).
    Incomplete,
}

/// Header information common to both major versions.
#[derive(Debug, Clone, Default)]
pub struct FileHeader {
    /// Recording start, nanoseconds since the Unix epoch.
    pub start_time_ns: Option<u64>,
    pub comment: CommentMetadata,
}

/// The structure of an MDF file: everything except the sample data, which
/// stays in the file and is addressed through [`DataFragment`]s.
#[derive(Debug, Clone)]
pub struct MdfFile {
    pub identification: IdentificationBlock,
    pub version: MajorVersion,
    pub header: FileHeader,
    pub data_groups: Vec<RawDataGroup>,
    pub status: ParseStatus,
}

impl MdfFile {
    /// Parse the MDF file at `path`.
    pub fn parse_file(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Self> {
        let mut reader = BufferedRangeReader::new(path)?;
        Self::parse(&mut reader, options)
    }

    /// Walk the block graph of an MDF file.
    ///
    /// # Arguments
    /// * `reader` - Random-access byte source holding the whole file
    /// * `options` - Import options; only the abort handle is consulted here
    ///
    /// # Returns
    /// The parsed structure, or an [`crate::Error`] for unsupported versions
    /// and structural corruption.
    pub fn parse<R: ByteRangeReader + ?Sized>(
        reader: &mut R,
        options: &ImportOptions,
    ) -> Result<Self> {
        let id_bytes = reader.read_range(0, IdentificationBlock::SIZE as u64)?;
        let identification = IdentificationBlock::from_bytes(&id_bytes)?;
        let version = identification.major_version()?;
        if identification.is_unfinalized() {
            log::warn!(
                "file is unfinalized (flags {:#06x}); cycle counts may be stale",
                identification.unfinalized_flags
            );
        }

        let mut blocks = BlockReader::new(reader, version);
        let (header, data_groups, status) = match version {
            MajorVersion::V4 => walk_v4(&mut blocks, options)?,
            MajorVersion::V3 => walk_v3(&mut blocks, &identification, options)?,
        };
        log::info!(
            "parsed MDF {} ({}): {} data groups, {} channel groups, {} channels{}",
            identification.version_number,
            identification.program_id,
            data_groups.len(),
            data_groups
                .iter()
                .map(|dg| dg.channel_groups.len())
                .sum::<usize>(),
            data_groups
                .iter()
                .flat_map(|dg| &dg.channel_groups)
                .map(|cg| cg.channels.len())
                .sum::<usize>(),
            if status == ParseStatus::Incomplete {
                " (aborted)"
            } else {
                ""
            }
        );

        Ok(Self {
            identification,
            version,
            header,
            data_groups,
            status,
        })
    }
}

type Walk = (FileHeader, Vec<RawDataGroup>, ParseStatus);

fn walk_v4<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    options: &ImportOptions,
) -> Result<Walk> {
    let hd: HeaderBlock = reader.read(IdentificationBlock::SIZE as u64)?;
    let comment = reader
        .read_text(hd.comment_addr)?
        .map(|c| parse_comment(&c))
        .unwrap_or_default();
    if hd.file_history_addr != 0 {
        log::debug!("skipping file history at {:#x}", hd.file_history_addr);
    }
    for (link, what) in [
        (hd.channel_tree_addr, "channel hierarchy"),
        (hd.first_attachment_addr, "attachments"),
        (hd.first_event_addr, "events"),
    ] {
        if link != 0 {
            log::warn!("skipping {what} at {link:#x}");
        }
    }
    let header = FileHeader {
        start_time_ns: (hd.abs_time != 0).then_some(hd.abs_time),
        comment,
    };

    let mut data_groups = Vec::new();
    let mut visited = BTreeSet::new();
    let mut next = hd.first_dg_addr;
    while next != 0 {
        if options.abort.is_aborted() {
            log::warn!("parse aborted after {} data groups", data_groups.len());
            return Ok((header, data_groups, ParseStatus::Incomplete));
        }
        visit(&mut visited, next, "data group")?;
        let dg: DataGroupBlock = reader.read(next)?;
        log::debug!("data group at {next:#x}");

        let mut channel_groups = Vec::new();
        let mut cg_visited = BTreeSet::new();
        let mut cg_next = dg.first_cg_addr;
        while cg_next != 0 {
            visit(&mut cg_visited, cg_next, "channel group")?;
            let cg: ChannelGroupBlock = reader.read(cg_next)?;
            channel_groups.push(RawChannelGroup::from_v4(reader, &cg, cg_next)?);
            cg_next = cg.next_cg_addr;
        }

        data_groups.push(RawDataGroup {
            comment: reader
                .read_text(dg.comment_addr)?
                .and_then(|c| parse_comment(&c).text),
            record_id_size: dg.record_id_size,
            trailing_record_id: false,
            channel_groups,
            fragments: discover_v4(reader, dg.data_block_addr)?,
        });
        next = dg.next_dg_addr;
    }
    Ok((header, data_groups, ParseStatus::Complete))
}

fn walk_v3<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    identification: &IdentificationBlock,
    options: &ImportOptions,
) -> Result<Walk> {
    let hd: v3::HeaderBlock = reader.read(IdentificationBlock::SIZE as u64)?;
    let mut comment = CommentMetadata {
        text: reader
            .read_text(hd.comment_addr as u64)?
            .filter(|c| !c.is_empty()),
        properties: Vec::new(),
    };
    for (key, value) in [
        ("author", &hd.author),
        ("organization", &hd.organization),
        ("project", &hd.project),
        ("subject", &hd.subject),
    ] {
        if !value.is_empty() {
            comment.properties.push((key.to_string(), value.clone()));
        }
    }
    let header = FileHeader {
        start_time_ns: hd
            .timestamp_ns
            .filter(|ns| *ns != 0)
            .or_else(|| v3_start_time(&hd.date, &hd.time)),
        comment,
    };

    let file_size = reader.source().size();
    let mut data_groups = Vec::new();
    let mut visited = BTreeSet::new();
    let mut next = hd.first_dg_addr as u64;
    while next != 0 {
        if options.abort.is_aborted() {
            log::warn!("parse aborted after {} data groups", data_groups.len());
            return Ok((header, data_groups, ParseStatus::Incomplete));
        }
        visit(&mut visited, next, "data group")?;
        let dg: v3::DataGroupBlock = reader.read(next)?;
        if dg.trigger_addr != 0 {
            log::warn!("skipping trigger block at {:#x}", dg.trigger_addr);
        }

        let mut channel_groups = Vec::new();
        let mut cg_visited = BTreeSet::new();
        let mut cg_next = dg.first_cg_addr as u64;
        while cg_next != 0 {
            visit(&mut cg_visited, cg_next, "channel group")?;
            let cg: v3::ChannelGroupBlock = reader.read(cg_next)?;
            channel_groups.push(RawChannelGroup::from_v3(
                reader,
                &cg,
                cg_next,
                identification.byte_order,
            )?);
            cg_next = cg.next_cg_addr as u64;
        }

        let mut group = RawDataGroup {
            comment: None,
            record_id_size: u8::from(dg.record_id_count > 0),
            trailing_record_id: dg.record_id_count == 2,
            channel_groups,
            fragments: Vec::new(),
        };
        let declared: u64 = group
            .channel_groups
            .iter()
            .map(|cg| cg.cycle_count * group.record_size(cg))
            .sum();
        let offset = dg.data_addr as u64;
        if offset != 0 && declared > 0 {
            let available = file_size.saturating_sub(offset);
            if declared > available {
                log::warn!(
                    "data group at {next:#x} declares {declared} record bytes, file holds {available}"
                );
            }
            group.fragments.push(DataFragment::Stored {
                offset,
                length: declared.min(available),
            });
        }
        data_groups.push(group);
        next = dg.next_dg_addr as u64;
    }
    Ok((header, data_groups, ParseStatus::Complete))
}

/// Start time from the 3.x `DD:MM:YYYY` date and `HH:MM:SS` time fields.
fn v3_start_time(date: &str, time: &str) -> Option<u64> {
    let date = NaiveDate::parse_from_str(date, "%d:%m:%Y").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;
    let ns = NaiveDateTime::new(date, time)
        .and_utc()
        .timestamp_nanos_opt()?;
    u64::try_from(ns).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v3_date_and_time() {
        assert_eq!(
            v3_start_time("02:01:1970", "00:00:01"),
            Some(86_401_000_000_000)
        );
        assert_eq!(v3_start_time("2024-01-01", "00:00:00"), None);
    }
}
