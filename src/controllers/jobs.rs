use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::job::{CleanupReport, JobResponse, JobService, JobServiceApi},
    error::AppResult,
};

pub struct JobsController {
    job_service: Arc<JobService>,
}

impl JobsController {
    pub fn new(job_service: Arc<JobService>) -> Self {
        Self { job_service }
    }

    /// GET /jobs - List generated audio, newest first
    pub async fn list_jobs(
        State(controller): State<Arc<JobsController>>,
    ) -> AppResult<Json<Vec<JobResponse>>> {
        let jobs = controller.job_service.list_jobs().await;
        Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
    }

    /// GET /jobs/:id - One job
    pub async fn get_job(
        State(controller): State<Arc<JobsController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<Json<JobResponse>> {
        let job = controller.job_service.get_job(id).await?;
        Ok(Json(JobResponse::from(job)))
    }

    /// DELETE /jobs/:id - Remove a job and its audio file
    pub async fn delete_job(
        State(controller): State<Arc<JobsController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller.job_service.delete_job(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// GET|POST /cleanup - Remove every job
    pub async fn cleanup(State(controller): State<Arc<JobsController>>) -> Json<CleanupReport> {
        Json(controller.job_service.cleanup().await)
    }
}
