use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};
use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;

/// Decode text of unknown encoding.
///
/// A byte order mark decides when present, then strict UTF-8; anything else
/// is read as Windows-1252, which maps every byte.
pub(crate) fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text
        }
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::PlainText]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        ExtractedText::new(decode_text(bytes).into_owned(), 0)
    }
}

/// Reads CSV rows cell by cell, one line per row
pub struct CsvExtractor;

impl TextExtractor for CsvExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Csv]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let text = decode_text(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ExtractionError::failed("csv", e))?;
            let cells: Vec<&str> = record
                .iter()
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            if !cells.is_empty() {
                lines.push(cells.join(", "));
            }
        }

        ExtractedText::new(lines.join("\n"), 0)
    }
}
