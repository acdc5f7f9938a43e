use super::{BlockReader, RawChannelGroup, raw_channel_group::visit, reader::ByteRangeReader};
use crate::{
    Error, Result,
    blocks::{BlockHeader, DataListBlock, DzBlock, HeaderListBlock, read_u64},
};
use std::collections::{BTreeMap, BTreeSet};

/// A contiguous piece of a data group's record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFragment {
    /// Bytes stored uncompressed at `offset` in the source file.
    Stored { offset: u64, length: u64 },
    /// A `##DZ` block at `position` inflating to `length` bytes.
    Compressed { position: u64, length: u64 },
}

impl DataFragment {
    pub fn len(&self) -> u64 {
        match *self {
            DataFragment::Stored { length, .. } | DataFragment::Compressed { length, .. } => length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct RawDataGroup {
    pub comment: Option<String>,
    /// Bytes of the record id in front of every record.
    pub record_id_size: u8,
    /// 3.x groups may repeat the record id after the record.
    pub trailing_record_id: bool,
    pub channel_groups: Vec<RawChannelGroup>,
    /// The record stream in order.
    pub fragments: Vec<DataFragment>,
}

impl RawDataGroup {
    /// Bytes of one record of `group`, record ids included.
    pub fn record_size(&self, group: &RawChannelGroup) -> u64 {
        let trailing = if self.trailing_record_id {
            self.record_id_size as u64
        } else {
            0
        };
        self.record_id_size as u64
            + group.data_bytes as u64
            + group.invalidation_bytes as u64
            + trailing
    }

    /// Records of several channel groups are interleaved.
    pub fn is_unsorted(&self) -> bool {
        self.channel_groups.len() > 1
    }

    pub fn data_length(&self) -> u64 {
        self.fragments.iter().map(DataFragment::len).sum()
    }

    /// Read the whole record stream into memory, inflating compressed fragments.
    pub fn read_all<R: ByteRangeReader + ?Sized>(
        &self,
        reader: &mut BlockReader<'_, R>,
    ) -> Result<Vec<u8>> {
        read_fragments(reader, &self.fragments)
    }

    /// Split an unsorted record stream per record id.
    ///
    /// Fixed-size records keep their data and invalidation bytes without the
    /// record ids. VLSD groups keep the `u32` length prefix of every value, the
    /// same layout as a signal data block.
    pub fn split_records(&self, data: &[u8]) -> Result<BTreeMap<u64, Vec<u8>>> {
        let id_size = self.record_id_size as usize;
        if !matches!(id_size, 1 | 2 | 4 | 8) {
            return Err(Error::corrupt(format!(
                "unsorted data group with {id_size} byte record ids"
            )));
        }
        let groups: BTreeMap<u64, &RawChannelGroup> = self
            .channel_groups
            .iter()
            .map(|cg| (cg.record_id, cg))
            .collect();
        let mut split: BTreeMap<u64, Vec<u8>> =
            groups.keys().map(|id| (*id, Vec::new())).collect();

        let mut pos = 0usize;
        while pos < data.len() {
            let id = read_record_id(data, pos, id_size)?;
            let group = groups.get(&id).ok_or_else(|| {
                Error::corrupt(format!("unknown record id {id} at stream offset {pos}"))
            })?;
            pos += id_size;
            let body_len = if group.is_vlsd {
                let len = data
                    .get(pos..pos + 4)
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
                    .ok_or_else(|| Error::corrupt("truncated VLSD record"))?;
                4 + len
            } else {
                (group.data_bytes + group.invalidation_bytes) as usize
            };
            let body = data.get(pos..pos + body_len).ok_or_else(|| {
                Error::corrupt(format!("record {id} at stream offset {pos} is truncated"))
            })?;
            if let Some(out) = split.get_mut(&id) {
                out.extend_from_slice(body);
            }
            pos += body_len;
            if self.trailing_record_id {
                pos += id_size;
            }
        }
        Ok(split)
    }
}

fn read_record_id(data: &[u8], pos: usize, size: usize) -> Result<u64> {
    let bytes = data
        .get(pos..pos + size)
        .ok_or_else(|| Error::corrupt(format!("truncated record id at stream offset {pos}")))?;
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Concatenate fragments into memory.
pub fn read_fragments<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    fragments: &[DataFragment],
) -> Result<Vec<u8>> {
    let total: u64 = fragments.iter().map(DataFragment::len).sum();
    let mut out = Vec::with_capacity(total as usize);
    for fragment in fragments {
        match *fragment {
            DataFragment::Stored { offset, length } => {
                out.extend_from_slice(&reader.source().read_range(offset, length)?);
            }
            DataFragment::Compressed { position, .. } => {
                let dz: DzBlock = reader.read(position)?;
                out.extend_from_slice(&dz.decompress()?);
            }
        }
    }
    Ok(out)
}

/// Collect the fragments behind a 4.x data link (`##DT`, `##DV`, `##SD`,
/// `##DZ`, `##DL` chains and `##HL` lists).
pub fn discover_v4<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    address: u64,
) -> Result<Vec<DataFragment>> {
    let mut fragments = Vec::new();
    let mut visited = BTreeSet::new();
    collect(reader, address, &mut fragments, &mut visited)?;
    Ok(fragments)
}

fn collect<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    address: u64,
    fragments: &mut Vec<DataFragment>,
    visited: &mut BTreeSet<u64>,
) -> Result<()> {
    if address == 0 {
        return Ok(());
    }
    visit(visited, address, "data")?;
    let header = reader.read_header(address)?;
    match header.id.as_str() {
        "##DT" | "##DV" | "##SD" => {
            let start = BlockHeader::SIZE as u64 + header.link_count * 8;
            fragments.push(DataFragment::Stored {
                offset: address + start,
                length: header.length.saturating_sub(start),
            });
        }
        "##DZ" => {
            let head = reader
                .source()
                .read_range(address + BlockHeader::SIZE as u64, 16)?;
            fragments.push(DataFragment::Compressed {
                position: address,
                length: read_u64(&head, 8)?,
            });
        }
        "##DL" => {
            let mut next = address;
            loop {
                let dl: DataListBlock = reader.read(next)?;
                for &link in &dl.data_links {
                    collect(reader, link, fragments, visited)?;
                }
                if dl.next == 0 {
                    break;
                }
                next = dl.next;
                visit(visited, next, "data list")?;
            }
        }
        "##HL" => {
            let hl: HeaderListBlock = reader.read(address)?;
            collect(reader, hl.first_dl_addr, fragments, visited)?;
        }
        other => {
            return Err(Error::corrupt(format!(
                "data link {address:#x} points to a {other} block"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{
        MajorVersion,
        raw_channel_group::RawChannelGroup,
        reader::MemoryRangeReader,
    };

    fn block(id: &[u8; 4], links: &[u64], payload: &[u8]) -> Vec<u8> {
        let length = 24 + links.len() * 8 + payload.len();
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(length as u64).to_le_bytes());
        out.extend_from_slice(&(links.len() as u64).to_le_bytes());
        for l in links {
            out.extend_from_slice(&l.to_le_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    fn group(record_id: u64, data_bytes: u32, is_vlsd: bool) -> RawChannelGroup {
        RawChannelGroup {
            name: None,
            comment: None,
            record_id,
            cycle_count: 0,
            data_bytes,
            invalidation_bytes: 0,
            is_vlsd,
            position: 0,
            channels: Vec::new(),
        }
    }

    #[test]
    fn follows_data_list_chain() -> Result<()> {
        // DT(4 bytes) at 8, DT(2 bytes) at 36, DL at 62 -> both
        let mut file = vec![0u8; 8];
        file.extend(block(b"##DT", &[], &[1, 2, 3, 4]));
        let second = file.len() as u64;
        file.extend(block(b"##DT", &[], &[5, 6]));
        let dl_at = file.len() as u64;
        let mut payload = vec![0u8, 0, 0, 0];
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&0u64.to_le_bytes());
        payload.extend_from_slice(&4u64.to_le_bytes());
        file.extend(block(b"##DL", &[0, 8, second], &payload));

        let mut source = MemoryRangeReader::new(file);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V4);
        let fragments = discover_v4(&mut reader, dl_at)?;
        assert_eq!(
            fragments,
            vec![
                DataFragment::Stored { offset: 32, length: 4 },
                DataFragment::Stored { offset: second + 24, length: 2 },
            ]
        );
        assert_eq!(read_fragments(&mut reader, &fragments)?, vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn rejects_structural_block_as_data() {
        let mut file = vec![0u8; 8];
        file.extend(block(b"##CG", &[0; 6], &[0; 32]));
        let mut source = MemoryRangeReader::new(file);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V4);
        assert!(matches!(discover_v4(&mut reader, 8), Err(Error::CorruptFile(_))));
    }

    #[test]
    fn splits_interleaved_records() -> Result<()> {
        let dg = RawDataGroup {
            comment: None,
            record_id_size: 1,
            trailing_record_id: false,
            channel_groups: vec![group(1, 2, false), group(2, 0, true)],
            fragments: Vec::new(),
        };
        let stream = [
            1, 0xAA, 0xBB, // fixed record
            2, 3, 0, 0, 0, b'a', b'b', b'c', // VLSD value "abc"
            1, 0xCC, 0xDD,
        ];
        let split = dg.split_records(&stream)?;
        assert_eq!(split[&1], vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(split[&2], vec![3, 0, 0, 0, b'a', b'b', b'c']);
        assert!(dg.split_records(&[9, 0, 0]).is_err());
        Ok(())
    }

    #[test]
    fn trailing_record_id_counts_in_record_size() {
        let dg = RawDataGroup {
            comment: None,
            record_id_size: 1,
            trailing_record_id: true,
            channel_groups: vec![group(1, 4, false)],
            fragments: Vec::new(),
        };
        assert_eq!(dg.record_size(&dg.channel_groups[0]), 6);
    }
}
