#![forbid(unsafe_code)]

use transcript_contracts::StudentId;
use transcript_storage::StorageError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// No transcript exists for the requested student id.
    #[error("unknown ID")]
    UnknownId(StudentId),
    #[error("course not found in transcript")]
    CourseNotFound { student_id: StudentId, course: String },
    #[error("store failure: {0}")]
    Store(#[from] StorageError),
}

impl ServiceError {
    pub fn is_unknown_id(&self) -> bool {
        matches!(self, ServiceError::UnknownId(_))
    }
}
