use crate::{
    Result,
    blocks::common::{BlockParse, read_f64, read_fixed_str, read_u16, read_u32},
    parsing::RawBlock,
};

/// One 3.x text range entry: lower, upper, TX link.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRangeEntry {
    pub lower: f64,
    pub upper: f64,
    pub text_addr: u32,
}

/// Parameters of a 3.x `CC` block, decoded according to its type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionParams {
    /// Plain f64 parameters (linear, tables, rational, ...).
    Numbers(Vec<f64>),
    /// Type 11: value and 32-char text per entry.
    TextTable(Vec<(f64, String)>),
    /// Type 12: the first entry only carries the default text link.
    TextRange(Vec<TextRangeEntry>),
    /// Type 10: ASAM-MCD2 text formula.
    Formula(String),
    /// Identity (65535) and types without parameters.
    None,
}

#[derive(Debug, Clone)]
pub struct ConversionBlock {
    pub unit: String,
    pub conversion_type: u16,
    pub params: ConversionParams,
}

impl BlockParse for ConversionBlock {
    const ID: &'static str = "CC";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let b = &raw.payload;
        let conversion_type = read_u16(b, 42)?;
        let count = read_u16(b, 44)? as usize;
        let params = match conversion_type {
            0 | 6..=9 => ConversionParams::Numbers(
                (0..count).map(|i| read_f64(b, 46 + i * 8)).collect::<Result<_>>()?,
            ),
            // tables store `count` (raw, physical) pairs
            1 | 2 => ConversionParams::Numbers(
                (0..count * 2).map(|i| read_f64(b, 46 + i * 8)).collect::<Result<_>>()?,
            ),
            11 => ConversionParams::TextTable(
                (0..count)
                    .map(|i| {
                        let at = 46 + i * 40;
                        Ok((read_f64(b, at)?, read_fixed_str(b, at + 8, 32)?))
                    })
                    .collect::<Result<_>>()?,
            ),
            12 => ConversionParams::TextRange(
                (0..count)
                    .map(|i| {
                        let at = 46 + i * 20;
                        Ok(TextRangeEntry {
                            lower: read_f64(b, at)?,
                            upper: read_f64(b, at + 8)?,
                            text_addr: read_u32(b, at + 16)?,
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            10 => {
                let len = b.len().saturating_sub(46).min(256);
                ConversionParams::Formula(read_fixed_str(b, 46, len)?)
            }
            _ => ConversionParams::None,
        };
        Ok(Self {
            unit: read_fixed_str(b, 22, 20)?,
            conversion_type,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(conversion_type: u16, count: u16, params: &[u8]) -> RawBlock {
        let mut b = vec![0u8; 46];
        b[0..2].copy_from_slice(b"CC");
        b[22..25].copy_from_slice(b"rpm");
        b[42..44].copy_from_slice(&conversion_type.to_le_bytes());
        b[44..46].copy_from_slice(&count.to_le_bytes());
        b.extend_from_slice(params);
        let len = b.len() as u16;
        b[2..4].copy_from_slice(&len.to_le_bytes());
        RawBlock {
            id: "CC".into(),
            position: 0x100,
            length: len as u64,
            link_count: 0,
            links: vec![],
            payload: b,
        }
    }

    #[test]
    fn linear_parameters() {
        let mut params = Vec::new();
        params.extend_from_slice(&10f64.to_le_bytes());
        params.extend_from_slice(&2f64.to_le_bytes());
        let block = ConversionBlock::from_raw(&cc(0, 2, &params)).unwrap();
        assert_eq!(block.unit, "rpm");
        assert_eq!(block.params, ConversionParams::Numbers(vec![10.0, 2.0]));
    }

    #[test]
    fn text_table_entries() {
        let mut params = Vec::new();
        for (v, t) in [(0f64, "Off"), (1f64, "On")] {
            params.extend_from_slice(&v.to_le_bytes());
            let mut text = [0u8; 32];
            text[..t.len()].copy_from_slice(t.as_bytes());
            params.extend_from_slice(&text);
        }
        let block = ConversionBlock::from_raw(&cc(11, 2, &params)).unwrap();
        assert_eq!(
            block.params,
            ConversionParams::TextTable(vec![(0.0, "Off".into()), (1.0, "On".into())])
        );
    }

    #[test]
    fn identity_has_no_params() {
        let block = ConversionBlock::from_raw(&cc(65535, 0, &[])).unwrap();
        assert_eq!(block.params, ConversionParams::None);
    }
}
