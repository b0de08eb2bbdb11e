use super::plain_text::decode_text;
use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};
use quick_xml::events::Event;
use quick_xml::Reader;

pub struct HtmlExtractor;

impl TextExtractor for HtmlExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Html]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let html = decode_text(bytes);
        let text = html2text::from_read(html.as_bytes(), usize::MAX);
        ExtractedText::new(text, 0)
    }
}

/// Generic XML: every text node on its own line
pub struct XmlExtractor;

impl TextExtractor for XmlExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Xml]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let xml = decode_text(bytes);
        let mut reader = Reader::from_str(&xml);
        let mut nodes = Vec::new();

        loop {
            let node = match reader.read_event() {
                Ok(Event::Text(e)) => e
                    .unescape()
                    .map_err(|e| ExtractionError::failed("xml", e))?
                    .into_owned(),
                Ok(Event::CData(e)) => String::from_utf8_lossy(&e.into_inner()).into_owned(),
                Ok(Event::Eof) => break,
                Ok(_) => continue,
                Err(e) => {
                    return Err(ExtractionError::failed(
                        "xml",
                        format!("at byte {}: {}", reader.error_position(), e),
                    ))
                }
            };

            let node = node.trim();
            if !node.is_empty() {
                nodes.push(node.to_string());
            }
        }

        ExtractedText::new(nodes.join("\n"), 0)
    }
}
