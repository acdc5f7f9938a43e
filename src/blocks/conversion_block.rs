use crate::{
    Result,
    blocks::common::{BlockParse, link, read_f64, read_u8, read_u16},
    parsing::RawBlock,
};

/// `##CC`: channel conversion as stored, with unresolved references.
///
/// Turning this into a [`crate::conversion::ConversionRule`] needs the
/// referenced TX and CC blocks and happens in the parser.
#[derive(Debug, Clone)]
pub struct ConversionBlock {
    pub name_addr: u64,
    pub unit_addr: u64,
    pub comment_addr: u64,
    pub inverse_addr: u64,
    /// `cc_ref` links: texts or nested conversions, depending on the type.
    pub refs: Vec<u64>,
    pub conversion_type: u8,
    pub precision: u8,
    pub flags: u16,
    pub phys_range: Option<(f64, f64)>,
    pub values: Vec<f64>,
}

impl BlockParse for ConversionBlock {
    const ID: &'static str = "##CC";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let data = &raw.payload;
        let value_count = read_u16(data, 6)? as usize;

        // Some writers leave out the physical range; detect it by size.
        let has_range = data.len() >= 24 + value_count * 8;
        let values_start = if has_range { 24 } else { 8 };
        let phys_range = if has_range {
            Some((read_f64(data, 8)?, read_f64(data, 16)?))
        } else {
            None
        };
        let values = (0..value_count)
            .map(|i| read_f64(data, values_start + i * 8))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name_addr: link(&raw.links, 0),
            unit_addr: link(&raw.links, 1),
            comment_addr: link(&raw.links, 2),
            inverse_addr: link(&raw.links, 3),
            refs: raw.links.iter().skip(4).copied().collect(),
            conversion_type: read_u8(data, 0)?,
            precision: read_u8(data, 1)?,
            flags: read_u16(data, 2)?,
            phys_range,
            values,
        })
    }
}
