use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};

/// Page by page PDF text extraction
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractionError::failed("pdf", e))?;

        let page_count = pages.len();
        let mut degraded = 0;
        let mut texts = Vec::with_capacity(page_count);

        for (number, page) in pages.into_iter().enumerate() {
            let page = page.trim();
            if page.is_empty() {
                tracing::debug!(page = number + 1, "PDF page yielded no text");
                degraded += 1;
            } else {
                texts.push(page.to_string());
            }
        }

        if texts.is_empty() {
            return Err(ExtractionError::failed(
                "pdf",
                format!("none of the {} pages yielded text", page_count),
            ));
        }

        ExtractedText::new(texts.join("\n\n"), degraded)
    }
}
