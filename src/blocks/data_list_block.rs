use crate::{
    Error, Result,
    blocks::common::{BlockParse, link, read_u8, read_u16, read_u32, read_u64},
    parsing::RawBlock,
};

/// DLBLOCK: Data List Block (ordered list of data fragments)
#[derive(Debug, Clone)]
pub struct DataListBlock {
    /// Link to the next DLBLOCK (0 = end of list).
    pub next: u64,
    /// Links to DT/DV/SD/DZ fragments.
    pub data_links: Vec<u64>,
    pub flags: u8,
    /// Common fragment data length when the equal-length flag is set.
    pub equal_length: Option<u64>,
    /// Logical start offset of every fragment otherwise.
    pub offsets: Vec<u64>,
}

impl DataListBlock {
    pub const FLAG_EQUAL_LENGTH: u8 = 0x01;
}

impl BlockParse for DataListBlock {
    const ID: &'static str = "##DL";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let data = &raw.payload;
        let data_links: Vec<u64> = raw.links.iter().skip(1).copied().collect();
        let flags = read_u8(data, 0)?;
        let count = read_u32(data, 4)? as usize;
        if count != data_links.len() {
            return Err(Error::corrupt(format!(
                "DL block at {:#x} declares {count} fragments but links {}",
                raw.position,
                data_links.len()
            )));
        }
        let (equal_length, offsets) = if flags & Self::FLAG_EQUAL_LENGTH != 0 {
            (Some(read_u64(data, 8)?), Vec::new())
        } else {
            let offsets = (0..count)
                .map(|i| read_u64(data, 8 + i * 8))
                .collect::<Result<Vec<_>>>()?;
            (None, offsets)
        };
        Ok(Self {
            next: link(&raw.links, 0),
            data_links,
            flags,
            equal_length,
            offsets,
        })
    }
}

/// HLBLOCK: header of a list of compressed fragments.
#[derive(Debug, Clone)]
pub struct HeaderListBlock {
    pub first_dl_addr: u64,
    pub flags: u16,
    pub zip_type: u8,
}

impl BlockParse for HeaderListBlock {
    const ID: &'static str = "##HL";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        Ok(Self {
            first_dl_addr: link(&raw.links, 0),
            flags: read_u16(&raw.payload, 0)?,
            zip_type: read_u8(&raw.payload, 2)?,
        })
    }
}
