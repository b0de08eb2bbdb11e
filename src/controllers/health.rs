use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::{
    domain::{
        conversion::{ConversionService, ConversionServiceApi},
        job::{JobService, JobServiceApi},
    },
    infrastructure::storage::ArtifactStore,
};

/// Response for GET /status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub tts_backend: String,
    pub timestamp: DateTime<Utc>,
    pub storage_dir: String,
    pub active_files: usize,
}

pub struct HealthController {
    store: Arc<ArtifactStore>,
    conversion_service: Arc<ConversionService>,
    job_service: Arc<JobService>,
}

impl HealthController {
    pub fn new(
        store: Arc<ArtifactStore>,
        conversion_service: Arc<ConversionService>,
        job_service: Arc<JobService>,
    ) -> Self {
        Self {
            store,
            conversion_service,
            job_service,
        }
    }

    /// GET /health - Liveness
    pub async fn health() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// GET /health/ready - Ready when artifacts can be written
    pub async fn health_ready(State(controller): State<Arc<HealthController>>) -> impl IntoResponse {
        let tts = controller.conversion_service.backend_name();

        if controller.store.is_writable().await {
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "storage": "writable",
                    "tts": tts
                })),
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "storage": "unwritable",
                    "tts": tts
                })),
            )
        }
    }

    /// GET /status - Service summary
    pub async fn status(State(controller): State<Arc<HealthController>>) -> Json<StatusResponse> {
        Json(StatusResponse {
            status: "online".to_string(),
            tts_backend: controller.conversion_service.backend_name().to_string(),
            timestamp: Utc::now(),
            storage_dir: controller.store.root().display().to_string(),
            active_files: controller.job_service.active_jobs(),
        })
    }
}
