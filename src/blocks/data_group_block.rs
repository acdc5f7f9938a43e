use crate::{
    Result,
    blocks::common::{BlockParse, link, read_u8},
    parsing::RawBlock,
};

/// Data Group Block (##DG) - groups channel groups that share a data block.
#[derive(Debug, Clone)]
pub struct DataGroupBlock {
    /// Link to next data group block (0 if last).
    pub next_dg_addr: u64,
    /// Link to first channel group block.
    pub first_cg_addr: u64,
    /// Link to data block (DT, DV, DZ, DL, HL).
    pub data_block_addr: u64,
    /// Link to comment text/metadata block.
    pub comment_addr: u64,
    /// Size of record ID in bytes (0, 1, 2, 4, or 8).
    pub record_id_size: u8,
}

impl BlockParse for DataGroupBlock {
    const ID: &'static str = "##DG";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        Ok(Self {
            next_dg_addr: link(&raw.links, 0),
            first_cg_addr: link(&raw.links, 1),
            data_block_addr: link(&raw.links, 2),
            comment_addr: link(&raw.links, 3),
            record_id_size: read_u8(&raw.payload, 0)?,
        })
    }
}
