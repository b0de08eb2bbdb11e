pub mod error;

pub use error::ExtractionError;

use std::path::Path;

/// Document format families the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    PlainText,
    Csv,
    Pdf,
    Docx,
    OpenDocumentText,
    OpenDocumentPresentation,
    Spreadsheet,
    Pptx,
    Rtf,
    Html,
    Xml,
}

impl DocumentFormat {
    /// Map a bare extension (`"pdf"`, `".DOCX"`) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();

        match ext.as_str() {
            "txt" | "text" | "md" | "markdown" => Some(Self::PlainText),
            "csv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "odt" => Some(Self::OpenDocumentText),
            "odp" => Some(Self::OpenDocumentPresentation),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "pptx" => Some(Self::Pptx),
            "rtf" => Some(Self::Rtf),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::OpenDocumentText => "odt",
            Self::OpenDocumentPresentation => "odp",
            Self::Spreadsheet => "spreadsheet",
            Self::Pptx => "pptx",
            Self::Rtf => "rtf",
            Self::Html => "html",
            Self::Xml => "xml",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercased extension of a filename, without the dot
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Raw uploaded bytes plus the declared extension.
///
/// A document is read once by an extractor and then dropped.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename).unwrap_or_default();
        Self {
            filename,
            extension,
            bytes,
        }
    }
}

/// Successful extraction output. `text` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub char_count: usize,
    /// Structural units (pages, sheets, slides) that yielded nothing or failed
    pub degraded_units: usize,
}

impl ExtractedText {
    pub fn new(text: String, degraded_units: usize) -> Result<Self, ExtractionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ExtractionError::Empty);
        }
        let text = trimmed.to_string();
        Ok(Self {
            char_count: text.chars().count(),
            text,
            degraded_units,
        })
    }
}
