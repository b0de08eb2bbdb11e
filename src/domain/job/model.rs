use crate::domain::audio::AudioFormat;
use crate::domain::conversion::VoiceSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Registry metadata describing one generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub path: PathBuf,
    pub filename: String,
    pub format: AudioFormat,
    pub size_bytes: u64,
    /// Playback length of the assembled audio
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub text_length: usize,
    /// Chunks that made it into the artifact
    pub chunk_count: usize,
    /// Indices of chunks whose synthesis failed and were left out
    pub skipped_chunks: Vec<usize>,
    pub voice: VoiceSpec,
}

impl JobRecord {
    pub fn download_url(&self) -> String {
        format!("/download/{}", self.id)
    }
}
