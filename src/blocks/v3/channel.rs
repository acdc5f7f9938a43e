use crate::{
    Result,
    blocks::common::{BlockParse, read_fixed_str, read_u16, read_u32},
    parsing::RawBlock,
    types::ByteOrder,
};

/// 3.x signal data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V3DataType {
    Unsigned(Option<ByteOrder>),
    Signed(Option<ByteOrder>),
    Float(Option<ByteOrder>),
    /// VAX floating point formats (4, 5, 6), not decodable.
    VaxFloat,
    String,
    ByteArray,
    Unknown(u16),
}

impl V3DataType {
    /// `None` byte order means "file default" from the identification block.
    pub fn from_u16(value: u16) -> Self {
        use ByteOrder::{BigEndian, LittleEndian};
        match value {
            0 => Self::Unsigned(None),
            1 => Self::Signed(None),
            2 | 3 => Self::Float(None),
            4..=6 => Self::VaxFloat,
            7 => Self::String,
            8 => Self::ByteArray,
            9 => Self::Unsigned(Some(BigEndian)),
            10 => Self::Signed(Some(BigEndian)),
            11 | 12 => Self::Float(Some(BigEndian)),
            13 => Self::Unsigned(Some(LittleEndian)),
            14 => Self::Signed(Some(LittleEndian)),
            15 | 16 => Self::Float(Some(LittleEndian)),
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelBlock {
    pub next_cn_addr: u32,
    pub conversion_addr: u32,
    pub comment_addr: u32,
    /// 0 = data, 1 = time master.
    pub channel_type: u16,
    pub short_name: String,
    pub description: String,
    pub start_bit: u16,
    pub bit_count: u16,
    pub data_type: V3DataType,
    pub long_name_addr: u32,
    pub display_name_addr: u32,
    pub additional_byte_offset: u16,
}

impl ChannelBlock {
    pub fn is_master(&self) -> bool {
        self.channel_type == 1
    }

    /// Byte offset of the value within the record's data bytes.
    pub fn byte_offset(&self) -> u32 {
        self.start_bit as u32 / 8 + self.additional_byte_offset as u32
    }

    pub fn bit_offset(&self) -> u8 {
        (self.start_bit % 8) as u8
    }
}

impl BlockParse for ChannelBlock {
    const ID: &'static str = "CN";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let b = &raw.payload;
        let optional_u32 = |offset: usize| if b.len() >= offset + 4 { read_u32(b, offset) } else { Ok(0) };
        let additional_byte_offset = if b.len() >= 228 { read_u16(b, 226)? } else { 0 };
        Ok(Self {
            next_cn_addr: read_u32(b, 4)?,
            conversion_addr: read_u32(b, 8)?,
            comment_addr: read_u32(b, 20)?,
            channel_type: read_u16(b, 24)?,
            short_name: read_fixed_str(b, 26, 32)?,
            description: read_fixed_str(b, 58, 128)?,
            start_bit: read_u16(b, 186)?,
            bit_count: read_u16(b, 188)?,
            data_type: V3DataType::from_u16(read_u16(b, 190)?),
            long_name_addr: optional_u32(218)?,
            display_name_addr: optional_u32(222)?,
            additional_byte_offset,
        })
    }
}
