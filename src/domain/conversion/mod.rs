pub mod chunker;
pub mod error;
pub mod language;
pub mod service;
pub mod text;
pub mod voice;

pub use chunker::{split, Chunk};
pub use error::{ChunkFailure, ConversionServiceError};
pub use language::{build_detector, detect_language, LanguageCode};
pub use service::{ConversionService, ConversionServiceApi, ConversionSource};
pub use voice::{resolve_voice, CatalogVoice, SpeedRange, VoiceSpec};

use serde::{Deserialize, Serialize};

/// Request for POST /convert
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// Caller-supplied voice parameters before normalization
#[derive(Debug, Clone, Default)]
pub struct VoiceRequest {
    pub voice: Option<String>,
    pub speed: Option<f32>,
}

/// Tunables of the conversion pipeline
#[derive(Debug, Clone)]
pub struct ConversionSettings {
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub chunk_max_chars: usize,
    pub speed_range: SpeedRange,
    /// Shortest accepted text, in characters
    pub min_text_chars: usize,
    pub inter_chunk_silence_ms: u32,
    /// Chunks synthesized at the same time
    pub synthesis_concurrency: usize,
    /// Used when the text's language cannot be detected
    pub default_language: LanguageCode,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: [
                "txt", "md", "csv", "pdf", "docx", "odt", "odp", "rtf", "xlsx", "xls", "ods",
                "pptx", "html", "htm", "xml",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            chunk_max_chars: 4500,
            speed_range: SpeedRange::default(),
            min_text_chars: 5,
            inter_chunk_silence_ms: 250,
            synthesis_concurrency: 4,
            default_language: LanguageCode::Portuguese,
        }
    }
}
