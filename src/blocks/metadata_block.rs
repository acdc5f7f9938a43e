use crate::{Result, blocks::common::BlockParse, parsing::RawBlock};

/// `##MD`: an XML fragment, kept verbatim.
///
/// Interpretation (the `<TX>` element, `common_properties`) happens in
/// [`crate::parsing::metadata`].
#[derive(Debug, Clone)]
pub struct MetadataBlock {
    pub xml: String,
}

impl BlockParse for MetadataBlock {
    const ID: &'static str = "##MD";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let xml = String::from_utf8_lossy(&raw.payload)
            .trim_matches('\0')
            .to_string();
        Ok(Self { xml })
    }
}
