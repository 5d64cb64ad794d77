#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use transcript_contracts::{Course, GradeEntry, GradeHandle, GradeValue, StudentId, StudentName};
use transcript_storage::{
    GradeRecord, GradeRecordRepo, StorageError, TranscriptProjection, TranscriptRecord,
    TranscriptRecordRepo,
};

use crate::error::ServiceError;

/// Client-facing transcript: grade handles resolved, store metadata dropped.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptView {
    pub student_id: StudentId,
    pub student_name: StudentName,
    pub grades: Vec<GradeEntry>,
}

const GRADES_ONLY: TranscriptProjection = TranscriptProjection {
    student_id: false,
    student_name: false,
    grades: true,
};

/// Student/transcript operations over the two record stores.
///
/// Student ids come from an in-process counter seeded from the highest id in
/// the store at construction. Two service instances over one store will hand
/// out the same ids; the store's unique key on `student_id` rejects the second
/// write.
#[derive(Debug)]
pub struct TranscriptService<S> {
    store: S,
    next_id: StudentId,
}

impl<S> TranscriptService<S>
where
    S: TranscriptRecordRepo + GradeRecordRepo,
{
    pub fn new(store: S) -> Self {
        let next_id = store
            .max_student_id()
            .map(StudentId::next)
            .unwrap_or(StudentId::FIRST);
        tracing::debug!(next_id = next_id.0, "student id allocator initialized");
        Self { store, next_id }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn add_student(&mut self, name: StudentName) -> Result<StudentId, ServiceError> {
        let id = self.next_id;
        self.next_id = id.next();
        self.store.create_transcript_row(TranscriptRecord::v1(id, name))?;
        tracing::info!(student_id = id.0, "student added");
        Ok(id)
    }

    pub fn all_student_ids(&self) -> Vec<StudentId> {
        self.store
            .transcript_rows_projected(TranscriptProjection::STUDENT_ID_ONLY)
            .into_iter()
            .filter_map(|row| row.student_id)
            .collect()
    }

    /// Ids of every student whose stored name equals `name` exactly.
    pub fn name_to_ids(&self, name: &str) -> Vec<StudentId> {
        // A name that fails validation can never have been stored.
        let Ok(name) = StudentName::new(name) else {
            return Vec::new();
        };
        self.store
            .transcript_rows_by_name(&name)
            .into_iter()
            .map(|t| t.student_id)
            .collect()
    }

    pub fn transcript(&self, id: StudentId) -> Result<TranscriptView, ServiceError> {
        let record = self
            .store
            .transcript_row(id)
            .ok_or(ServiceError::UnknownId(id))?;
        let grades = record
            .grades
            .iter()
            .map(|handle| self.resolve_grade(handle))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TranscriptView {
            student_id: record.student_id,
            student_name: record.student_name.clone(),
            grades,
        })
    }

    fn resolve_grade(&self, handle: &GradeHandle) -> Result<GradeEntry, StorageError> {
        self.store
            .grade_row(handle)
            .map(GradeRecord::to_entry)
            .ok_or_else(|| StorageError::ForeignKeyViolation {
                table: "transcripts.grades",
                key: handle.to_string(),
            })
    }

    /// Creates the grade record, then appends its handle to the transcript.
    /// The two writes are not atomic: a failure on the second leaves the grade
    /// record unreferenced (see `orphaned_grade_handles`).
    pub fn add_grade(
        &mut self,
        id: StudentId,
        course: Course,
        grade: GradeValue,
    ) -> Result<(), ServiceError> {
        if self.store.transcript_row(id).is_none() {
            return Err(ServiceError::UnknownId(id));
        }
        let handle = self.store.create_grade_row(course, grade)?;
        if !self.store.append_grade_handle(id, handle.clone())? {
            tracing::warn!(
                student_id = id.0,
                handle = %handle,
                "transcript vanished before grade append"
            );
            return Err(ServiceError::UnknownId(id));
        }
        tracing::info!(student_id = id.0, handle = %handle, "grade appended");
        Ok(())
    }

    /// First grade recorded for `course` on the student's transcript.
    pub fn grade(&self, id: StudentId, course: &str) -> Result<GradeValue, ServiceError> {
        let transcript = self.transcript(id)?;
        transcript
            .grades
            .into_iter()
            .find(|g| g.course.as_str() == course)
            .map(|g| g.grade)
            .ok_or_else(|| ServiceError::CourseNotFound {
                student_id: id,
                course: course.to_string(),
            })
    }

    /// Grade records no transcript references, left behind by a partially
    /// failed `add_grade`. Report only; nothing is removed.
    pub fn orphaned_grade_handles(&self) -> Vec<GradeHandle> {
        let referenced: BTreeSet<GradeHandle> = self
            .store
            .transcript_rows_projected(GRADES_ONLY)
            .into_iter()
            .filter_map(|row| row.grades)
            .flatten()
            .collect();
        self.store
            .grade_handles()
            .into_iter()
            .filter(|h| !referenced.contains(h))
            .collect()
    }

    pub fn student_count(&self) -> usize {
        self.store.transcript_row_count()
    }
}
