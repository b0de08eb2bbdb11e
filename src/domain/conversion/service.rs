use super::chunker::{self, Chunk};
use super::error::{ChunkFailure, ConversionServiceError};
use super::language::{build_detector, detect_language};
use super::text;
use super::voice::{resolve_voice, VoiceSpec};
use super::{ConversionSettings, VoiceRequest};
use crate::domain::audio::{assembler, AudioFormat, AudioSegment, SegmentLayout};
use crate::domain::document::{extension_of, Document};
use crate::domain::job::JobRecord;
use crate::infrastructure::extractors::ExtractorRegistry;
use crate::infrastructure::repositories::{JobRepository, Synthesizer};
use crate::infrastructure::storage::{ArtifactStore, StagedUpload, StoredArtifact};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use futures::{future, stream, StreamExt};
use lingua::LanguageDetector;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Where the text of a conversion comes from
#[derive(Debug)]
pub enum ConversionSource {
    Text(String),
    /// A document staged on disk; it is deleted once its text is extracted
    Upload(StagedUpload),
}

/// Per-chunk results folded into successes and skipped failures
#[derive(Default)]
struct SynthesisOutcome {
    segments: Vec<(AudioSegment, SegmentLayout)>,
    failures: Vec<ChunkFailure>,
}

impl SynthesisOutcome {
    fn record(mut self, result: Result<(AudioSegment, SegmentLayout), ChunkFailure>) -> Self {
        match result {
            Ok(segment) => self.segments.push(segment),
            Err(failure) => self.skip(failure),
        }
        self
    }

    fn skip(&mut self, failure: ChunkFailure) {
        tracing::warn!(
            chunk_index = failure.index,
            cause = %failure.cause,
            "Chunk synthesis failed, skipping chunk"
        );
        self.failures.push(failure);
    }

    /// Skip segments whose layout differs from the earliest chunk's, then
    /// return the survivors in chunk order
    fn into_compatible(mut self) -> (Vec<AudioSegment>, Vec<ChunkFailure>) {
        self.segments.sort_by_key(|(segment, _)| segment.chunk_index);

        let mut segments = Vec::with_capacity(self.segments.len());
        let mut reference: Option<SegmentLayout> = None;
        for (segment, layout) in std::mem::take(&mut self.segments) {
            match reference {
                Some(expected) if expected != layout => self.skip(ChunkFailure {
                    index: segment.chunk_index,
                    cause: format!("audio layout {} differs from {}", layout, expected),
                }),
                _ => {
                    reference = Some(layout);
                    segments.push(segment);
                }
            }
        }

        self.failures.sort_by_key(|f| f.index);
        (segments, self.failures)
    }
}

pub struct ConversionService {
    synthesizer: Arc<dyn Synthesizer>,
    extractors: Arc<ExtractorRegistry>,
    store: Arc<ArtifactStore>,
    jobs: Arc<JobRepository>,
    settings: ConversionSettings,
    language_detector: LanguageDetector,
}

impl ConversionService {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        extractors: Arc<ExtractorRegistry>,
        store: Arc<ArtifactStore>,
        jobs: Arc<JobRepository>,
        settings: ConversionSettings,
    ) -> Self {
        Self {
            synthesizer,
            extractors,
            store,
            jobs,
            settings,
            language_detector: build_detector(),
        }
    }
}

#[async_trait]
pub trait ConversionServiceApi: Send + Sync {
    /// Convert raw text or an uploaded document into a registered audio artifact
    ///
    /// This operation:
    /// - Extracts text from uploads and deletes the staged file
    /// - Rejects empty or too short text
    /// - Resolves the voice and clamps the speed
    /// - Synthesizes every chunk, skipping chunks that fail
    /// - Assembles the surviving segments in chunk order, persists and registers the artifact
    ///
    /// Once `cancel` fires no further chunk is dispatched and nothing is persisted.
    async fn convert(
        &self,
        source: ConversionSource,
        voice: VoiceRequest,
        cancel: CancellationToken,
    ) -> Result<JobRecord, ConversionServiceError>;

    /// Reject an upload by its filename before any of it is stored
    fn check_upload_name(&self, filename: &str) -> Result<(), ConversionServiceError>;

    fn settings(&self) -> &ConversionSettings;

    /// Name of the synthesis backend in use
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl ConversionServiceApi for ConversionService {
    async fn convert(
        &self,
        source: ConversionSource,
        voice: VoiceRequest,
        cancel: CancellationToken,
    ) -> Result<JobRecord, ConversionServiceError> {
        let start_time = std::time::Instant::now();

        // 1. Resolve and normalize the text
        let raw_text = self.resolve_text(source).await?;
        let text = text::normalize(&raw_text);
        let text_length = text::char_count(&text);
        self.validate_length(text_length)?;

        // 2. Normalize voice parameters
        let voice = self.normalize_voice(&voice, &text)?;

        // 3. Chunk within both our own and the backend's limit
        let max_chars = self
            .settings
            .chunk_max_chars
            .min(self.synthesizer.max_chunk_chars());
        let chunks = chunker::split(&text, max_chars);

        tracing::info!(
            provider = self.synthesizer.name(),
            text_length,
            chunk_count = chunks.len(),
            max_chars,
            voice = %voice.voice,
            language = %voice.language,
            speed = voice.speed,
            "Starting conversion"
        );

        // 4. Synthesize, continuing past failed chunks
        let outcome = self.synthesize_chunks(&chunks, &voice, &cancel).await;

        if cancel.is_cancelled() {
            tracing::warn!(text_length, "Conversion cancelled, discarding synthesized audio");
            return Err(ConversionServiceError::Cancelled);
        }

        let (segments, failures) = outcome.into_compatible();
        if segments.is_empty() {
            let cause = failures
                .first()
                .map(|f| f.cause.clone())
                .unwrap_or_else(|| "no chunk was synthesized".to_string());
            return Err(ConversionServiceError::SynthesisFailed {
                attempted: chunks.len(),
                cause,
            });
        }

        let chunk_count = segments.len();
        let skipped_chunks: Vec<usize> = failures.iter().map(|f| f.index).collect();

        // 5. Assemble in chunk order
        let silence_ms = self.settings.inter_chunk_silence_ms;
        let audio = tokio::task::spawn_blocking(move || assembler::assemble(segments, silence_ms))
            .await
            .map_err(|e| anyhow!("audio assembly task failed: {}", e))??;
        let format = self.synthesizer.audio_format();
        let duration_ms = assembler::duration_ms(format, &audio)?.round() as u64;

        if cancel.is_cancelled() {
            tracing::warn!(text_length, "Conversion cancelled before persisting");
            return Err(ConversionServiceError::Cancelled);
        }

        // 6. Persist and register
        let id = Uuid::new_v4();
        let artifact = self.persist(id, format, &audio, &cancel).await?;

        let record = JobRecord {
            id,
            path: artifact.path,
            filename: artifact.filename,
            format,
            size_bytes: artifact.size_bytes,
            duration_ms,
            created_at: Utc::now(),
            text_length,
            chunk_count,
            skipped_chunks,
            voice,
        };
        self.jobs.put(record.clone());

        tracing::info!(
            job_id = %record.id,
            provider = self.synthesizer.name(),
            latency_ms = start_time.elapsed().as_millis(),
            text_length,
            chunk_count,
            skipped_chunks = record.skipped_chunks.len(),
            size_bytes = record.size_bytes,
            duration_ms,
            "Conversion completed"
        );

        Ok(record)
    }

    fn check_upload_name(&self, filename: &str) -> Result<(), ConversionServiceError> {
        let extension = extension_of(filename)
            .ok_or_else(|| ConversionServiceError::UnsupportedFormat(filename.to_string()))?;
        self.extractors.resolve(&extension)?;
        Ok(())
    }

    fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    fn backend_name(&self) -> &'static str {
        self.synthesizer.name()
    }
}

impl ConversionService {
    async fn resolve_text(&self, source: ConversionSource) -> Result<String, ConversionServiceError> {
        let upload = match source {
            ConversionSource::Text(text) => return Ok(text),
            ConversionSource::Upload(upload) => upload,
        };

        self.extractors.resolve(upload.extension())?;

        let size = tokio::fs::metadata(upload.path())
            .await
            .map_err(|e| anyhow!("failed to inspect staged upload: {}", e))?
            .len();
        if size > self.settings.max_upload_bytes as u64 {
            return Err(ConversionServiceError::PayloadTooLarge {
                size,
                limit: self.settings.max_upload_bytes,
            });
        }

        let bytes = tokio::fs::read(upload.path())
            .await
            .map_err(|e| anyhow!("failed to read staged upload: {}", e))?;
        let document = Document::new(upload.filename(), bytes);

        let extracted = self.extractors.extract(document).await;
        drop(upload);

        Ok(extracted?.text)
    }

    fn validate_length(&self, text_length: usize) -> Result<(), ConversionServiceError> {
        if text_length == 0 {
            return Err(ConversionServiceError::Validation(
                "Text cannot be empty".to_string(),
            ));
        }

        if text_length < self.settings.min_text_chars {
            return Err(ConversionServiceError::Validation(format!(
                "Text must be at least {} characters long",
                self.settings.min_text_chars
            )));
        }

        Ok(())
    }

    fn normalize_voice(
        &self,
        request: &VoiceRequest,
        text: &str,
    ) -> Result<VoiceSpec, ConversionServiceError> {
        let speed = self.settings.speed_range.clamp(request.speed);
        if let Some(requested) = request.speed.filter(|requested| *requested != speed) {
            tracing::debug!(requested, speed, "Speed adjusted to supported range");
        }

        let voice = resolve_voice(
            request.voice.as_deref(),
            || detect_language(&self.language_detector, text, self.settings.default_language),
            self.synthesizer.voices(),
        )
        .ok_or_else(|| anyhow!("synthesizer {} offers no voices", self.synthesizer.name()))?;

        Ok(VoiceSpec {
            voice: voice.id.to_string(),
            language: voice.language,
            speed,
        })
    }

    /// Write the artifact, removing it again if the conversion was cancelled meanwhile
    async fn persist(
        &self,
        id: Uuid,
        format: AudioFormat,
        audio: &[u8],
        cancel: &CancellationToken,
    ) -> Result<StoredArtifact, ConversionServiceError> {
        let artifact = self.store.write_artifact(id, format, audio).await?;

        if cancel.is_cancelled() {
            tracing::warn!(job_id = %id, "Conversion cancelled while persisting");
            self.store.discard_artifact(&artifact).await;
            return Err(ConversionServiceError::Cancelled);
        }

        Ok(artifact)
    }

    /// Synthesize chunks with bounded concurrency; results arrive in completion order.
    /// A chunk whose turn comes after cancellation is never sent.
    async fn synthesize_chunks(
        &self,
        chunks: &[Chunk],
        voice: &VoiceSpec,
        cancel: &CancellationToken,
    ) -> SynthesisOutcome {
        let tasks: Vec<_> = chunks
            .iter()
            .map(|chunk| async move {
                if cancel.is_cancelled() {
                    None
                } else {
                    Some(self.synthesize_chunk(chunk, voice).await)
                }
            })
            .collect();

        stream::iter(tasks)
            .buffer_unordered(self.settings.synthesis_concurrency.max(1))
            .fold(SynthesisOutcome::default(), |outcome, result| {
                future::ready(match result {
                    Some(result) => outcome.record(result),
                    None => outcome,
                })
            })
            .await
    }

    async fn synthesize_chunk(
        &self,
        chunk: &Chunk,
        voice: &VoiceSpec,
    ) -> Result<(AudioSegment, SegmentLayout), ChunkFailure> {
        let failure = |cause: String| ChunkFailure {
            index: chunk.index,
            cause,
        };

        let bytes = self
            .synthesizer
            .synthesize(&chunk.text, voice)
            .await
            .map_err(failure)?;

        if bytes.is_empty() {
            return Err(failure("synthesizer returned no audio".to_string()));
        }

        let format = self.synthesizer.audio_format();
        let info = assembler::inspect(chunk.index, format, &bytes)
            .map_err(|e| failure(e.to_string()))?;

        tracing::debug!(
            chunk_index = chunk.index,
            chunk_chars = chunk.char_len(),
            audio_size_bytes = bytes.len(),
            audio_duration_ms = info.duration_ms,
            "Chunk synthesized"
        );

        Ok((
            AudioSegment {
                chunk_index: chunk.index,
                format,
                bytes,
            },
            info.layout,
        ))
    }
}
