use super::{CleanupReport, JobError, JobRecord};
use crate::infrastructure::repositories::JobRepository;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::io::ErrorKind;
use std::sync::Arc;
use uuid::Uuid;

pub struct JobService {
    job_repo: Arc<JobRepository>,
}

impl JobService {
    pub fn new(job_repo: Arc<JobRepository>) -> Self {
        Self { job_repo }
    }
}

#[async_trait]
pub trait JobServiceApi: Send + Sync {
    async fn get_job(&self, id: Uuid) -> Result<JobRecord, JobError>;

    /// All jobs, newest first
    async fn list_jobs(&self) -> Vec<JobRecord>;

    /// Load a job's audio. A registered job whose file vanished is `FileMissing`.
    async fn read_artifact(&self, id: Uuid) -> Result<(JobRecord, Vec<u8>), JobError>;

    async fn delete_job(&self, id: Uuid) -> Result<(), JobError>;

    /// Remove every job and its artifact
    async fn cleanup(&self) -> CleanupReport;

    /// Remove jobs older than `ttl`
    async fn remove_expired(&self, ttl: Duration) -> CleanupReport;

    fn active_jobs(&self) -> usize;
}

#[async_trait]
impl JobServiceApi for JobService {
    async fn get_job(&self, id: Uuid) -> Result<JobRecord, JobError> {
        self.job_repo.get(id)
    }

    async fn list_jobs(&self) -> Vec<JobRecord> {
        self.job_repo.list_all()
    }

    async fn read_artifact(&self, id: Uuid) -> Result<(JobRecord, Vec<u8>), JobError> {
        let record = self.job_repo.get(id)?;

        match tokio::fs::read(&record.path).await {
            Ok(bytes) => Ok((record, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(job_id = %id, path = %record.path.display(), "Artifact file missing");
                Err(JobError::FileMissing(id))
            }
            Err(source) => Err(JobError::Read { id, source }),
        }
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), JobError> {
        self.job_repo.remove(id).await.map(|_| ())
    }

    async fn cleanup(&self) -> CleanupReport {
        let report = self.job_repo.clear().await;
        tracing::info!(
            cleaned = report.cleaned,
            errors = report.errors,
            remaining = report.remaining,
            "Cleanup finished"
        );
        report
    }

    async fn remove_expired(&self, ttl: Duration) -> CleanupReport {
        let report = self.job_repo.remove_older_than(Utc::now() - ttl).await;
        if report.cleaned > 0 || report.errors > 0 {
            tracing::info!(
                cleaned = report.cleaned,
                errors = report.errors,
                remaining = report.remaining,
                "Expired artifacts removed"
            );
        }
        report
    }

    fn active_jobs(&self) -> usize {
        self.job_repo.len()
    }
}
