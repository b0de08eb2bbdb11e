mod markup;
mod office_xml;
mod pdf;
mod plain_text;
mod rtf;
mod spreadsheet;

pub use markup::{HtmlExtractor, XmlExtractor};
pub use office_xml::{DocxExtractor, OpenDocumentExtractor, PptxExtractor};
pub use pdf::PdfExtractor;
pub use plain_text::{CsvExtractor, PlainTextExtractor};
pub use rtf::RtfExtractor;
pub use spreadsheet::SpreadsheetExtractor;

use crate::domain::document::{Document, DocumentFormat, ExtractedText, ExtractionError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Turns the bytes of one document format family into plain text.
///
/// Extraction is CPU bound and synchronous; callers go through
/// [`ExtractorRegistry::extract`], which runs it on the blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Formats this extractor handles
    fn formats(&self) -> &'static [DocumentFormat];

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

/// Dispatches documents to the extractor registered for their format
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn TextExtractor>>,
    allowed_extensions: HashSet<String>,
}

impl ExtractorRegistry {
    /// Registry with no extractors; only `allowed_extensions` may be registered for
    pub fn new(allowed_extensions: impl IntoIterator<Item = String>) -> Self {
        Self {
            extractors: HashMap::new(),
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Registry with every built-in extractor
    pub fn with_defaults(allowed_extensions: impl IntoIterator<Item = String>) -> Self {
        let mut registry = Self::new(allowed_extensions);
        registry.register(Arc::new(PlainTextExtractor));
        registry.register(Arc::new(CsvExtractor));
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(DocxExtractor));
        registry.register(Arc::new(PptxExtractor));
        registry.register(Arc::new(OpenDocumentExtractor));
        registry.register(Arc::new(SpreadsheetExtractor));
        registry.register(Arc::new(RtfExtractor));
        registry.register(Arc::new(HtmlExtractor));
        registry.register(Arc::new(XmlExtractor));
        registry
    }

    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        for format in extractor.formats() {
            self.extractors.insert(*format, extractor.clone());
        }
    }

    /// Resolve an extension to a format that is both allowed and extractable
    pub fn resolve(&self, extension: &str) -> Result<DocumentFormat, ExtractionError> {
        let extension = extension.trim().trim_start_matches('.').to_lowercase();
        let unsupported = || ExtractionError::UnsupportedFormat(extension.clone());

        if !self.allowed_extensions.contains(&extension) {
            return Err(unsupported());
        }

        DocumentFormat::from_extension(&extension)
            .filter(|format| self.extractors.contains_key(format))
            .ok_or_else(unsupported)
    }

    pub fn allowed_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.allowed_extensions.iter().cloned().collect();
        extensions.sort();
        extensions
    }

    /// Extract text from a document. The document is consumed.
    pub async fn extract(&self, document: Document) -> Result<ExtractedText, ExtractionError> {
        let format = self.resolve(&document.extension)?;
        let extractor = self
            .extractors
            .get(&format)
            .cloned()
            .ok_or_else(|| ExtractionError::UnsupportedFormat(document.extension.clone()))?;

        let start_time = std::time::Instant::now();
        let filename = document.filename.clone();
        let size_bytes = document.bytes.len();

        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&document.bytes))
            .await
            .map_err(|e| ExtractionError::failed(format.as_str(), format!("parser crashed: {}", e)))??;

        if extracted.degraded_units > 0 {
            tracing::warn!(
                filename = %filename,
                format = %format,
                degraded_units = extracted.degraded_units,
                "Some parts of the document yielded no text"
            );
        }

        tracing::info!(
            filename = %filename,
            format = %format,
            size_bytes,
            text_length = extracted.char_count,
            latency_ms = start_time.elapsed().as_millis(),
            "Text extracted"
        );

        Ok(extracted)
    }
}
