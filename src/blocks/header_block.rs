use crate::{
    Result,
    blocks::common::{BlockParse, link, read_i16, read_u8, read_u64},
    parsing::RawBlock,
};

/// `##HD`: file-level header, always at offset 64.
#[derive(Debug, Clone)]
pub struct HeaderBlock {
    pub first_dg_addr: u64,
    pub file_history_addr: u64,
    pub channel_tree_addr: u64,
    pub first_attachment_addr: u64,
    pub first_event_addr: u64,
    pub comment_addr: u64,
    /// Start time in nanoseconds since 1970-01-01.
    pub abs_time: u64,
    /// Time zone offset in minutes.
    pub tz_offset: i16,
    /// Daylight saving offset in minutes.
    pub daylight_save_time: i16,
    pub time_flags: u8,
}

impl HeaderBlock {
    /// Local time bit of `time_flags`: `abs_time` is local rather than UTC.
    pub const LOCAL_TIME: u8 = 0x01;
    /// Offsets-valid bit of `time_flags`.
    pub const OFFSETS_VALID: u8 = 0x02;
}

impl BlockParse for HeaderBlock {
    const ID: &'static str = "##HD";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let data = &raw.payload;
        Ok(Self {
            first_dg_addr: link(&raw.links, 0),
            file_history_addr: link(&raw.links, 1),
            channel_tree_addr: link(&raw.links, 2),
            first_attachment_addr: link(&raw.links, 3),
            first_event_addr: link(&raw.links, 4),
            comment_addr: link(&raw.links, 5),
            abs_time: read_u64(data, 0)?,
            tz_offset: read_i16(data, 8)?,
            daylight_save_time: read_i16(data, 10)?,
            time_flags: read_u8(data, 12)?,
        })
    }
}
