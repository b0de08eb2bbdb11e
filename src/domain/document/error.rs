#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to extract {format}: {cause}")]
    Failed { format: String, cause: String },
    #[error("document contains no extractable text")]
    Empty,
}

impl ExtractionError {
    pub fn failed(format: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Failed {
            format: format.into(),
            cause: cause.to_string(),
        }
    }
}
