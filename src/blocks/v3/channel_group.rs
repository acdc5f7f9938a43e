use crate::{
    Result,
    blocks::common::{BlockParse, read_u16, read_u32},
    parsing::RawBlock,
};

#[derive(Debug, Clone)]
pub struct ChannelGroupBlock {
    pub next_cg_addr: u32,
    pub first_cn_addr: u32,
    pub comment_addr: u32,
    pub record_id: u16,
    pub channel_count: u16,
    /// Data bytes per record, record ids excluded.
    pub record_size: u16,
    pub record_count: u32,
}

impl BlockParse for ChannelGroupBlock {
    const ID: &'static str = "CG";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let b = &raw.payload;
        Ok(Self {
            next_cg_addr: read_u32(b, 4)?,
            first_cn_addr: read_u32(b, 8)?,
            comment_addr: read_u32(b, 12)?,
            record_id: read_u16(b, 16)?,
            channel_count: read_u16(b, 18)?,
            record_size: read_u16(b, 20)?,
            record_count: read_u32(b, 22)?,
        })
    }
}
