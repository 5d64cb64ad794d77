#![forbid(unsafe_code)]

use transcript_contracts::{Course, GradeHandle, GradeValue, StudentId, StudentName};

use crate::docstore::{
    GradeRecord, StorageError, TranscriptDocStore, TranscriptProjected, TranscriptProjection,
    TranscriptRecord,
};

/// Typed repository interface for the `transcripts` collection.
pub trait TranscriptRecordRepo {
    fn create_transcript_row(&mut self, record: TranscriptRecord) -> Result<(), StorageError>;
    fn transcript_row(&self, student_id: StudentId) -> Option<&TranscriptRecord>;
    fn transcript_rows_by_name(&self, name: &StudentName) -> Vec<&TranscriptRecord>;
    fn transcript_rows_projected(&self, projection: TranscriptProjection)
        -> Vec<TranscriptProjected>;
    fn max_student_id(&self) -> Option<StudentId>;
    fn append_grade_handle(
        &mut self,
        student_id: StudentId,
        handle: GradeHandle,
    ) -> Result<bool, StorageError>;
    fn transcript_row_count(&self) -> usize;
}

/// Typed repository interface for the `grades` collection.
pub trait GradeRecordRepo {
    fn create_grade_row(
        &mut self,
        course: Course,
        grade: GradeValue,
    ) -> Result<GradeHandle, StorageError>;
    fn grade_row(&self, handle: &GradeHandle) -> Option<&GradeRecord>;
    fn grade_handles(&self) -> Vec<GradeHandle>;
}

impl TranscriptRecordRepo for TranscriptDocStore {
    fn create_transcript_row(&mut self, record: TranscriptRecord) -> Result<(), StorageError> {
        self.insert_transcript(record)
    }

    fn transcript_row(&self, student_id: StudentId) -> Option<&TranscriptRecord> {
        self.transcript(student_id)
    }

    fn transcript_rows_by_name(&self, name: &StudentName) -> Vec<&TranscriptRecord> {
        self.transcripts_by_name(name)
    }

    fn transcript_rows_projected(
        &self,
        projection: TranscriptProjection,
    ) -> Vec<TranscriptProjected> {
        self.transcripts_projected(projection)
    }

    fn max_student_id(&self) -> Option<StudentId> {
        TranscriptDocStore::max_student_id(self)
    }

    fn append_grade_handle(
        &mut self,
        student_id: StudentId,
        handle: GradeHandle,
    ) -> Result<bool, StorageError> {
        self.push_grade_handle(student_id, handle)
    }

    fn transcript_row_count(&self) -> usize {
        self.transcripts().len()
    }
}

impl GradeRecordRepo for TranscriptDocStore {
    fn create_grade_row(
        &mut self,
        course: Course,
        grade: GradeValue,
    ) -> Result<GradeHandle, StorageError> {
        self.insert_grade(course, grade)
    }

    fn grade_row(&self, handle: &GradeHandle) -> Option<&GradeRecord> {
        self.grade(handle)
    }

    fn grade_handles(&self) -> Vec<GradeHandle> {
        self.grades().keys().cloned().collect()
    }
}
