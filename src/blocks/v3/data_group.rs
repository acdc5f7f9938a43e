use crate::{
    Result,
    blocks::common::{BlockParse, read_u16, read_u32},
    parsing::RawBlock,
};

#[derive(Debug, Clone)]
pub struct DataGroupBlock {
    pub next_dg_addr: u32,
    pub first_cg_addr: u32,
    pub trigger_addr: u32,
    /// Start of the record area (no block header in 3.x).
    pub data_addr: u32,
    pub cg_count: u16,
    /// 0, 1 (leading id byte) or 2 (leading and trailing id byte).
    pub record_id_count: u16,
}

impl BlockParse for DataGroupBlock {
    const ID: &'static str = "DG";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let b = &raw.payload;
        Ok(Self {
            next_dg_addr: read_u32(b, 4)?,
            first_cg_addr: read_u32(b, 8)?,
            trigger_addr: read_u32(b, 12)?,
            data_addr: read_u32(b, 16)?,
            cg_count: read_u16(b, 20)?,
            record_id_count: read_u16(b, 22)?,
        })
    }
}
