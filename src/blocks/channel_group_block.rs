use crate::{
    Result,
    blocks::common::{BlockParse, link, read_u16, read_u32, read_u64},
    parsing::RawBlock,
};

#[derive(Debug, Clone)]
pub struct ChannelGroupBlock {
    pub next_cg_addr: u64,
    pub first_ch_addr: u64,
    pub acq_name_addr: u64,
    pub acq_source_addr: u64,
    pub first_sample_reduction_addr: u64,
    pub comment_addr: u64,
    pub record_id: u64,
    pub cycles_nr: u64,
    pub flags: u16,
    pub path_separator: u16,
    pub samples_byte_nr: u32,
    pub invalidation_bytes_nr: u32,
}

impl ChannelGroupBlock {
    /// Records of this group are variable length signal data of another group.
    pub const FLAG_VLSD: u16 = 0x0001;

    pub fn is_vlsd(&self) -> bool {
        self.flags & Self::FLAG_VLSD != 0
    }
}

impl BlockParse for ChannelGroupBlock {
    const ID: &'static str = "##CG";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let data = &raw.payload;
        Ok(Self {
            next_cg_addr: link(&raw.links, 0),
            first_ch_addr: link(&raw.links, 1),
            acq_name_addr: link(&raw.links, 2),
            acq_source_addr: link(&raw.links, 3),
            first_sample_reduction_addr: link(&raw.links, 4),
            comment_addr: link(&raw.links, 5),
            record_id: read_u64(data, 0)?,
            cycles_nr: read_u64(data, 8)?,
            flags: read_u16(data, 16)?,
            path_separator: read_u16(data, 18)?,
            samples_byte_nr: read_u32(data, 24)?,
            invalidation_bytes_nr: read_u32(data, 28)?,
        })
    }
}
