use super::{BlockReader, RawChannel, metadata::parse_comment, reader::ByteRangeReader};
use crate::{
    Error, Result,
    blocks::{ChannelBlock, ChannelGroupBlock, v3},
    types::ByteOrder,
};
use std::collections::BTreeSet;

/// A channel group: one record layout and the channels stored in it.
#[derive(Debug, Clone)]
pub struct RawChannelGroup {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub record_id: u64,
    pub cycle_count: u64,
    /// Data bytes per record, excluding record id and invalidation bytes.
    pub data_bytes: u32,
    pub invalidation_bytes: u32,
    /// Holds variable-length signal data of another group's channel
    /// instead of fixed-size records.
    pub is_vlsd: bool,
    /// File position of the CG block, the target of VLSD channel links.
    pub position: u64,
    pub channels: Vec<RawChannel>,
}

/// Record `position` as visited, failing on a link loop.
pub(super) fn visit(visited: &mut BTreeSet<u64>, position: u64, what: &str) -> Result<()> {
    if !visited.insert(position) {
        return Err(Error::corrupt(format!(
            "{what} chain loops back to {position:#x}"
        )));
    }
    Ok(())
}

impl RawChannelGroup {
    pub fn from_v4<R: ByteRangeReader + ?Sized>(
        reader: &mut BlockReader<'_, R>,
        block: &ChannelGroupBlock,
        position: u64,
    ) -> Result<Self> {
        let name = reader.read_text(block.acq_name_addr)?;
        let comment = reader
            .read_text(block.comment_addr)?
            .and_then(|c| parse_comment(&c).text);

        let mut channels = Vec::new();
        if !block.is_vlsd() {
            let mut visited = BTreeSet::new();
            let mut next = block.first_ch_addr;
            while next != 0 {
                visit(&mut visited, next, "channel")?;
                let cn: ChannelBlock = reader.read(next)?;
                if let Some(channel) = RawChannel::from_v4(reader, &cn, block.samples_byte_nr)? {
                    channels.push(channel);
                }
                next = cn.next_ch_addr;
            }
        }
        log::debug!(
            "channel group at {position:#x}: {} channels, {} cycles",
            channels.len(),
            block.cycles_nr
        );

        Ok(Self {
            name,
            comment,
            record_id: block.record_id,
            cycle_count: block.cycles_nr,
            data_bytes: block.samples_byte_nr,
            invalidation_bytes: block.invalidation_bytes_nr,
            is_vlsd: block.is_vlsd(),
            position,
            channels,
        })
    }

    pub fn from_v3<R: ByteRangeReader + ?Sized>(
        reader: &mut BlockReader<'_, R>,
        block: &v3::ChannelGroupBlock,
        position: u64,
        default_order: ByteOrder,
    ) -> Result<Self> {
        let comment = reader.read_text(block.comment_addr as u64)?;

        let mut channels = Vec::new();
        let mut visited = BTreeSet::new();
        let mut next = block.first_cn_addr as u64;
        while next != 0 {
            visit(&mut visited, next, "channel")?;
            let cn: v3::ChannelBlock = reader.read(next)?;
            if let Some(channel) = RawChannel::from_v3(reader, &cn, next, default_order)? {
                channels.push(channel);
            }
            next = cn.next_cn_addr as u64;
        }
        if channels.len() != block.channel_count as usize {
            log::debug!(
                "channel group at {position:#x} declares {} channels, {} usable",
                block.channel_count,
                channels.len()
            );
        }

        Ok(Self {
            name: None,
            comment: comment.filter(|c| !c.is_empty()),
            record_id: block.record_id as u64,
            cycle_count: block.record_count as u64,
            data_bytes: block.record_size as u32,
            invalidation_bytes: 0,
            is_vlsd: false,
            position,
            channels,
        })
    }

    pub fn master(&self) -> Option<&RawChannel> {
        self.channels.iter().find(|c| c.role.is_master())
    }
}
