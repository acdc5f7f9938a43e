use crate::{
    Result,
    blocks::common::{BlockParse, read_fixed_str, read_u32, read_u64},
    parsing::RawBlock,
};

#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub first_dg_addr: u32,
    pub comment_addr: u32,
    pub program_addr: u32,
    /// "DD:MM:YYYY"
    pub date: String,
    /// "HH:MM:SS"
    pub time: String,
    pub author: String,
    pub organization: String,
    pub project: String,
    pub subject: String,
    /// Nanoseconds since 1970-01-01 (3.2 and later, `None` before).
    pub timestamp_ns: Option<u64>,
}

impl BlockParse for HeaderBlock {
    const ID: &'static str = "HD";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let b = &raw.payload;
        let timestamp_ns = if b.len() >= 172 {
            Some(read_u64(b, 164)?)
        } else {
            None
        };
        Ok(Self {
            first_dg_addr: read_u32(b, 4)?,
            comment_addr: read_u32(b, 8)?,
            program_addr: read_u32(b, 12)?,
            date: read_fixed_str(b, 18, 10)?,
            time: read_fixed_str(b, 28, 8)?,
            author: read_fixed_str(b, 36, 32)?,
            organization: read_fixed_str(b, 68, 32)?,
            project: read_fixed_str(b, 100, 32)?,
            subject: read_fixed_str(b, 132, 32)?,
            timestamp_ns,
        })
    }
}
