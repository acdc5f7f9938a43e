use crate::{Result, blocks::common::BlockParse, parsing::RawBlock};

/// `##TX`: a NUL-terminated UTF-8 string.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
}

impl BlockParse for TextBlock {
    const ID: &'static str = "##TX";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let end = raw
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(raw.payload.len());
        let text = String::from_utf8_lossy(&raw.payload[..end]).into_owned();
        Ok(Self { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_nul() {
        let raw = RawBlock {
            id: "##TX".into(),
            position: 0x100,
            length: 32,
            link_count: 0,
            links: vec![],
            payload: b"Engine speed\0\0\0\0".to_vec(),
        };
        assert_eq!(TextBlock::from_raw(&raw).unwrap().text, "Engine speed");
    }
}
