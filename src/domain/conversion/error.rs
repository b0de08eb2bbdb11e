use crate::domain::audio::AssemblyError;
use crate::domain::document::ExtractionError;
use crate::error::AppError;
use crate::infrastructure::storage::StorageError;

/// One chunk whose synthesis failed
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub index: usize,
    pub cause: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("upload of {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: usize },
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("synthesis failed for all {attempted} chunks: {cause}")]
    SynthesisFailed { attempted: usize, cause: String },
    #[error("conversion cancelled")]
    Cancelled,
    #[error("audio assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ExtractionError> for ConversionServiceError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(ext) => ConversionServiceError::UnsupportedFormat(ext),
            ExtractionError::Empty => {
                ConversionServiceError::Validation("document contains no text".to_string())
            }
            ExtractionError::Failed { .. } => ConversionServiceError::ExtractionFailed(err.to_string()),
        }
    }
}

impl From<ConversionServiceError> for AppError {
    fn from(err: ConversionServiceError) -> Self {
        match err {
            ConversionServiceError::Validation(msg) => AppError::BadRequest(msg),
            ConversionServiceError::UnsupportedFormat(ext) => {
                AppError::UnsupportedMediaType(format!("'{}' files are not supported", ext))
            }
            ConversionServiceError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ConversionServiceError::ExtractionFailed(msg) => AppError::Unprocessable(msg),
            ConversionServiceError::SynthesisFailed { .. } => AppError::ExternalService(err.to_string()),
            ConversionServiceError::Cancelled => AppError::ClientClosed,
            ConversionServiceError::Assembly(_)
            | ConversionServiceError::Storage(_)
            | ConversionServiceError::Other(_) => AppError::Internal(err.to_string()),
        }
    }
}
