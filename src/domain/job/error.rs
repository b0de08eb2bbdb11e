use crate::error::AppError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(Uuid),
    #[error("audio file for job {0} no longer exists")]
    FileMissing(Uuid),
    #[error("job {id} was unregistered but its file could not be deleted: {source}")]
    FileRemoval {
        id: Uuid,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read audio file for job {id}: {source}")]
    Read {
        id: Uuid,
        #[source]
        source: std::io::Error,
    },
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) | JobError::FileMissing(_) => AppError::NotFound(err.to_string()),
            JobError::FileRemoval { .. } | JobError::Read { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
