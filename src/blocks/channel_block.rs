use crate::{
    Result,
    blocks::common::{BlockParse, DataType, link, read_u8, read_u32},
    parsing::RawBlock,
};

/// `cn_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    FixedLength,
    VariableLength,
    Master,
    VirtualMaster,
    Sync,
    MaxLength,
    VirtualData,
    Unknown(u8),
}

impl ChannelType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::FixedLength,
            1 => Self::VariableLength,
            2 => Self::Master,
            3 => Self::VirtualMaster,
            4 => Self::Sync,
            5 => Self::MaxLength,
            6 => Self::VirtualData,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelBlock {
    pub next_ch_addr: u64,
    pub component_addr: u64,
    pub name_addr: u64,
    pub source_addr: u64,
    pub conversion_addr: u64,
    pub data_addr: u64,
    pub unit_addr: u64,
    pub comment_addr: u64,
    pub channel_type: ChannelType,
    pub sync_type: u8,
    pub data_type: DataType,
    pub bit_offset: u8,
    pub byte_offset: u32,
    pub bit_count: u32,
    pub flags: u32,
    pub pos_invalidation_bit: u32,
}

impl ChannelBlock {
    /// All values of this channel are invalid.
    pub const FLAG_ALL_INVALID: u32 = 0x0001;
    /// `pos_invalidation_bit` is meaningful.
    pub const FLAG_INVALIDATION_BIT_VALID: u32 = 0x0002;

    pub fn all_invalid(&self) -> bool {
        self.flags & Self::FLAG_ALL_INVALID != 0
    }

    pub fn has_invalidation_bit(&self) -> bool {
        self.flags & Self::FLAG_INVALIDATION_BIT_VALID != 0
    }
}

impl BlockParse for ChannelBlock {
    const ID: &'static str = "##CN";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let data = &raw.payload;
        Ok(Self {
            next_ch_addr: link(&raw.links, 0),
            component_addr: link(&raw.links, 1),
            name_addr: link(&raw.links, 2),
            source_addr: link(&raw.links, 3),
            conversion_addr: link(&raw.links, 4),
            data_addr: link(&raw.links, 5),
            unit_addr: link(&raw.links, 6),
            comment_addr: link(&raw.links, 7),
            channel_type: ChannelType::from_u8(read_u8(data, 0)?),
            sync_type: read_u8(data, 1)?,
            data_type: DataType::from_u8(read_u8(data, 2)?),
            bit_offset: read_u8(data, 3)?,
            byte_offset: read_u32(data, 4)?,
            bit_count: read_u32(data, 8)?,
            flags: read_u32(data, 12)?,
            pos_invalidation_bit: read_u32(data, 16)?,
        })
    }
}
