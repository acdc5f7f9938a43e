//! Interpretation of comment blocks.
//!
//! 4.x comments are either plain TX text or an MD XML fragment such as
//!
//! ```xml
//! <HDcomment>
//!   <TX>Road test, dry asphalt</TX>
//!   <common_properties>
//!     <e name="driver">J. Doe</e>
//!   </common_properties>
//! </HDcomment>
//! ```

use quick_xml::{Reader, events::Event};

/// Text and name/value properties carried by a comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentMetadata {
    pub text: Option<String>,
    pub properties: Vec<(String, String)>,
}

/// Interpret a resolved comment. XML that cannot be parsed degrades to an
/// empty result with a warning.
pub fn parse_comment(raw: &str) -> CommentMetadata {
    let trimmed = raw.trim();
    if !trimmed.starts_with('<') {
        return CommentMetadata {
            text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            properties: Vec::new(),
        };
    }
    match parse_xml(trimmed) {
        Ok(meta) => meta,
        Err(e) => {
            log::warn!("ignoring unparseable comment XML: {e}");
            CommentMetadata::default()
        }
    }
}

fn parse_xml(xml: &str) -> Result<CommentMetadata, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut meta = CommentMetadata::default();
    // element name stack, innermost last
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut property: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if name == b"e" && path.last().is_some_and(|p| p == b"common_properties") {
                    property = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"name")
                        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
                }
                text.clear();
                path.push(name);
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => {
                let name = path.pop().unwrap_or_default();
                let value = text.trim().to_string();
                if name == b"TX" && path.len() == 1 && meta.text.is_none() {
                    meta.text = (!value.is_empty()).then_some(value);
                } else if name == b"e" {
                    if let Some(key) = property.take() {
                        meta.properties.push((key, value));
                    }
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_comment() {
        let meta = parse_comment("  just text ");
        assert_eq!(meta.text.as_deref(), Some("just text"));
        assert!(meta.properties.is_empty());
    }

    #[test]
    fn extracts_tx_and_common_properties() {
        let xml = r#"<HDcomment xmlns="http://www.asam.net/mdf/v4">
            <TX>Road test &amp; more</TX>
            <common_properties>
                <e name="driver">J. Doe</e>
                <e name="vehicle" type="string">Prototype 2</e>
            </common_properties>
        </HDcomment>"#;
        let meta = parse_comment(xml);
        assert_eq!(meta.text.as_deref(), Some("Road test & more"));
        assert_eq!(
            meta.properties,
            vec![
                ("driver".to_string(), "J. Doe".to_string()),
                ("vehicle".to_string(), "Prototype 2".to_string())
            ]
        );
    }

    #[test]
    fn broken_xml_degrades_to_empty() {
        let meta = parse_comment("<HDcomment><TX>oops</HDcomment>");
        assert_eq!(meta, CommentMetadata::default());
    }
}
