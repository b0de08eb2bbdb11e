pub mod error;
pub mod model;
pub mod service;

pub use error::JobError;
pub use model::JobRecord;
pub use service::{JobService, JobServiceApi};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a bulk removal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Files deleted from storage
    pub cleaned: usize,
    /// Entries whose file could not be deleted
    pub errors: usize,
    /// Entries still registered after the sweep
    pub remaining: usize,
}

/// Public view of a job, returned by conversion and listing endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub text_length: usize,
    pub chunk_count: usize,
    pub skipped_chunks: Vec<usize>,
    pub voice: String,
    pub language: String,
    pub speed: f32,
    pub format: String,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<JobRecord> for JobResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            download_url: record.download_url(),
            id: record.id,
            filename: record.filename,
            size_bytes: record.size_bytes,
            duration_seconds: record.duration_ms as f64 / 1000.0,
            text_length: record.text_length,
            chunk_count: record.chunk_count,
            skipped_chunks: record.skipped_chunks,
            voice: record.voice.voice,
            language: record.voice.language.to_string(),
            speed: record.voice.speed,
            format: record.format.to_string(),
            created_at: record.created_at,
        }
    }
}
