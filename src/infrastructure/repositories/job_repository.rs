use crate::domain::job::{CleanupReport, JobError, JobRecord};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use uuid::Uuid;

/// What happened to an artifact file when its entry was dropped
enum FileOutcome {
    Deleted,
    AlreadyGone,
    Failed(std::io::Error),
}

async fn delete_file(path: &Path) -> FileOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => FileOutcome::Deleted,
        Err(e) if e.kind() == ErrorKind::NotFound => FileOutcome::AlreadyGone,
        Err(e) => FileOutcome::Failed(e),
    }
}

/// In-memory registry of generated artifacts.
///
/// Lives as long as the process. Every mutation takes the lock; entries are
/// detached under the lock and their files are deleted after it is released.
#[derive(Default)]
pub struct JobRepository {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
}

impl JobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, record: JobRecord) {
        self.jobs.lock().insert(record.id, record);
    }

    pub fn get(&self, id: Uuid) -> Result<JobRecord, JobError> {
        self.jobs
            .lock()
            .get(&id)
            .cloned()
            .ok_or(JobError::NotFound(id))
    }

    /// All registered jobs, newest first
    pub fn list_all(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.jobs.lock().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister a job and delete its artifact.
    ///
    /// The entry is gone even when deleting the file fails; that failure is
    /// returned as `FileRemoval`.
    pub async fn remove(&self, id: Uuid) -> Result<JobRecord, JobError> {
        let record = self.jobs.lock().remove(&id).ok_or(JobError::NotFound(id))?;

        match delete_file(&record.path).await {
            FileOutcome::Deleted | FileOutcome::AlreadyGone => {
                tracing::info!(job_id = %id, "Job removed");
                Ok(record)
            }
            FileOutcome::Failed(source) => {
                tracing::error!(job_id = %id, error = %source, "Job unregistered but file deletion failed");
                Err(JobError::FileRemoval { id, source })
            }
        }
    }

    /// Remove every registered job. Never stops at the first failure.
    pub async fn clear(&self) -> CleanupReport {
        let drained: Vec<JobRecord> = self.jobs.lock().drain().map(|(_, r)| r).collect();
        self.delete_all(drained).await
    }

    /// Remove jobs created before `cutoff`
    pub async fn remove_older_than(&self, cutoff: DateTime<Utc>) -> CleanupReport {
        let expired: Vec<JobRecord> = {
            let mut jobs = self.jobs.lock();
            let ids: Vec<Uuid> = jobs
                .values()
                .filter(|r| r.created_at < cutoff)
                .map(|r| r.id)
                .collect();
            ids.iter().filter_map(|id| jobs.remove(id)).collect()
        };
        self.delete_all(expired).await
    }

    async fn delete_all(&self, records: Vec<JobRecord>) -> CleanupReport {
        let mut report = CleanupReport::default();

        for record in records {
            match delete_file(&record.path).await {
                FileOutcome::Deleted => report.cleaned += 1,
                FileOutcome::AlreadyGone => {
                    tracing::warn!(job_id = %record.id, path = %record.path.display(), "Artifact already missing");
                }
                FileOutcome::Failed(e) => {
                    tracing::error!(job_id = %record.id, error = %e, "Failed to delete artifact");
                    report.errors += 1;
                }
            }
        }

        report.remaining = self.len();
        report
    }
}
