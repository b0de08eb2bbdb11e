use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    domain::{
        conversion::{
            ConversionService, ConversionServiceApi, ConversionServiceError, ConversionSource,
            ConvertRequest, VoiceRequest,
        },
        job::{JobRecord, JobResponse, JobService, JobServiceApi},
    },
    error::{AppError, AppResult},
    infrastructure::storage::{ArtifactStore, StagedUpload},
};

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

pub struct ConversionController {
    conversion_service: Arc<ConversionService>,
    job_service: Arc<JobService>,
    store: Arc<ArtifactStore>,
}

impl ConversionController {
    pub fn new(
        conversion_service: Arc<ConversionService>,
        job_service: Arc<JobService>,
        store: Arc<ArtifactStore>,
    ) -> Self {
        Self {
            conversion_service,
            job_service,
            store,
        }
    }

    /// POST /convert - Convert JSON text to audio
    pub async fn convert(
        State(controller): State<Arc<ConversionController>>,
        Json(request): Json<ConvertRequest>,
    ) -> AppResult<Json<JobResponse>> {
        let voice = VoiceRequest {
            voice: request.voice,
            speed: request.speed,
        };

        let record = controller
            .run_conversion(ConversionSource::Text(request.text), voice)
            .await?;

        Ok(Json(JobResponse::from(record)))
    }

    /// POST /convert-form - Convert form text or an uploaded document to audio
    pub async fn convert_form(
        State(controller): State<Arc<ConversionController>>,
        mut multipart: Multipart,
    ) -> AppResult<Json<JobResponse>> {
        let mut text: Option<String> = None;
        let mut voice = VoiceRequest::default();
        let mut upload: Option<StagedUpload> = None;

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "text" => {
                    text = Some(field.text().await.map_err(multipart_error)?);
                }
                "voice" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    voice.voice = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                "speed" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    let value = value.trim();
                    if !value.is_empty() {
                        let speed = value.parse::<f32>().map_err(|_| {
                            AppError::BadRequest(format!("speed must be a number, got '{}'", value))
                        })?;
                        voice.speed = Some(speed);
                    }
                }
                "file" => {
                    // Browsers send an empty file part when nothing was picked
                    let filename = field.file_name().unwrap_or_default().to_string();
                    if filename.is_empty() {
                        continue;
                    }
                    upload = Some(controller.stage_field(&filename, &mut field).await?);
                }
                _ => {
                    tracing::debug!(field = %name, "Ignoring unknown form field");
                }
            }
        }

        let source = match (text.filter(|t| !t.trim().is_empty()), upload) {
            (Some(text), _) => ConversionSource::Text(text),
            (None, Some(upload)) => ConversionSource::Upload(upload),
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Provide either a text field or a file".to_string(),
                ))
            }
        };

        let record = controller.run_conversion(source, voice).await?;

        Ok(Json(JobResponse::from(record)))
    }

    /// GET /download/:id - Stream a generated audio file
    pub async fn download(
        State(controller): State<Arc<ConversionController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let (record, bytes) = controller.job_service.read_artifact(id).await?;

        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            record.filename
        ))
        .map_err(|e| AppError::Internal(format!("invalid download filename: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(record.format.mime_type()),
        );
        headers.insert(header::CONTENT_DISPOSITION, disposition);

        tracing::info!(job_id = %id, size_bytes = bytes.len(), "Serving audio download");

        Ok((StatusCode::OK, headers, Body::from(bytes)))
    }

    /// Run the conversion in its own task, cancelled if this request goes away
    async fn run_conversion(
        &self,
        source: ConversionSource,
        voice: VoiceRequest,
    ) -> AppResult<JobRecord> {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        let service = self.conversion_service.clone();

        let task = tokio::spawn(async move { service.convert(source, voice, cancel).await });
        let result = task
            .await
            .map_err(|e| AppError::Internal(format!("conversion task failed: {}", e)))?;
        guard.disarm();

        Ok(result?)
    }

    /// Stream a file part to staging, enforcing the upload limit as bytes arrive
    async fn stage_field(&self, filename: &str, field: &mut Field<'_>) -> AppResult<StagedUpload> {
        self.conversion_service.check_upload_name(filename)?;

        let limit = self.conversion_service.settings().max_upload_bytes;
        let (upload, mut file) = self.store.create_upload(filename).await?;
        let write_error =
            |e: std::io::Error| AppError::Internal(format!("failed to stage upload: {}", e));

        let mut size = 0usize;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size += chunk.len();
            if size > limit {
                return Err(ConversionServiceError::PayloadTooLarge {
                    size: size as u64,
                    limit,
                }
                .into());
            }
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;

        tracing::debug!(filename, size_bytes = size, "Upload staged");

        Ok(upload)
    }
}
