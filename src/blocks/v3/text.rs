use crate::{Result, blocks::common::BlockParse, parsing::RawBlock};

/// `TX`: Latin-1 text after the 4-byte header.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
}

impl BlockParse for TextBlock {
    const ID: &'static str = "TX";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let body = raw.payload.get(4..).unwrap_or_default();
        let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        Ok(Self {
            text: body[..end].iter().map(|&b| b as char).collect(),
        })
    }
}
