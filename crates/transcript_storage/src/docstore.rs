#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use transcript_contracts::{
    ContractViolation, Course, GradeEntry, GradeHandle, GradeValue, SchemaVersion, StudentId,
    StudentName, Validate,
};

use crate::journal::{JournalEvent, StoreJournal};

pub const STORAGE_SCHEMA_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("foreign key violation in {table}: {key}")]
    ForeignKeyViolation { table: &'static str, key: String },
    #[error("duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("contract violation: {0}")]
    ContractViolation(ContractViolation),
    #[error("journal failure: {0}")]
    Journal(String),
}

impl From<ContractViolation> for StorageError {
    fn from(v: ContractViolation) -> Self {
        StorageError::ContractViolation(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradeRecord {
    pub schema_version: SchemaVersion,
    pub handle: GradeHandle,
    pub course: Course,
    pub grade: GradeValue,
}

impl GradeRecord {
    pub fn v1(handle: GradeHandle, course: Course, grade: GradeValue) -> Self {
        Self {
            schema_version: STORAGE_SCHEMA_VERSION,
            handle,
            course,
            grade,
        }
    }

    pub fn to_entry(&self) -> GradeEntry {
        GradeEntry::new(self.course.clone(), self.grade.clone())
    }
}

impl Validate for GradeRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != STORAGE_SCHEMA_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "grade_record.schema_version",
                reason: "must match STORAGE_SCHEMA_VERSION",
            });
        }
        self.handle.validate()?;
        self.course.validate()?;
        self.grade.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptRecord {
    pub schema_version: SchemaVersion,
    pub student_id: StudentId,
    pub student_name: StudentName,
    /// Grade handles in append order.
    pub grades: Vec<GradeHandle>,
}

impl TranscriptRecord {
    pub fn v1(student_id: StudentId, student_name: StudentName) -> Self {
        Self {
            schema_version: STORAGE_SCHEMA_VERSION,
            student_id,
            student_name,
            grades: Vec::new(),
        }
    }
}

impl Validate for TranscriptRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != STORAGE_SCHEMA_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "transcript_record.schema_version",
                reason: "must match STORAGE_SCHEMA_VERSION",
            });
        }
        self.student_name.validate()?;
        for handle in &self.grades {
            handle.validate()?;
        }
        Ok(())
    }
}

/// Field selection for bulk transcript reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptProjection {
    pub student_id: bool,
    pub student_name: bool,
    pub grades: bool,
}

impl TranscriptProjection {
    pub const STUDENT_ID_ONLY: TranscriptProjection = TranscriptProjection {
        student_id: true,
        student_name: false,
        grades: false,
    };

    pub const ALL: TranscriptProjection = TranscriptProjection {
        student_id: true,
        student_name: true,
        grades: true,
    };
}

/// A transcript row with unselected fields left as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptProjected {
    pub student_id: Option<StudentId>,
    pub student_name: Option<StudentName>,
    pub grades: Option<Vec<GradeHandle>>,
}

impl TranscriptProjected {
    fn from_record(record: &TranscriptRecord, projection: TranscriptProjection) -> Self {
        Self {
            student_id: projection.student_id.then_some(record.student_id),
            student_name: projection
                .student_name
                .then(|| record.student_name.clone()),
            grades: projection.grades.then(|| record.grades.clone()),
        }
    }
}

/// Document store holding the `transcripts` and `grades` collections.
#[derive(Debug)]
pub struct TranscriptDocStore {
    transcripts: BTreeMap<StudentId, TranscriptRecord>,
    grades: BTreeMap<GradeHandle, GradeRecord>,
    next_grade_seq: u64,
    journal: Option<StoreJournal>,
}

impl Default for TranscriptDocStore {
    fn default() -> Self {
        Self::new_in_memory()
    }
}

impl TranscriptDocStore {
    pub fn new_in_memory() -> Self {
        Self {
            transcripts: BTreeMap::new(),
            grades: BTreeMap::new(),
            next_grade_seq: 1,
            journal: None,
        }
    }

    /// Opens a journal-backed store, replaying every recorded write first.
    pub fn open_journaled(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let journal = StoreJournal::open(path)?;
        let events = journal.read_events()?;
        let mut store = Self::new_in_memory();
        let replayed = events.len();
        for (idx, event) in events.into_iter().enumerate() {
            store.check_event(&event).map_err(|err| {
                StorageError::Journal(format!("journal replay failed at entry {}: {err}", idx + 1))
            })?;
            store.apply_event(event);
        }
        tracing::info!(
            path = %journal.path().display(),
            replayed,
            transcripts = store.transcripts.len(),
            grades = store.grades.len(),
            "store journal replayed"
        );
        store.journal = Some(journal);
        Ok(store)
    }

    pub fn is_journaled(&self) -> bool {
        self.journal.is_some()
    }

    fn commit(&mut self, event: JournalEvent) -> Result<(), StorageError> {
        self.check_event(&event)?;
        if let Some(journal) = &self.journal {
            journal.append(&event)?;
        }
        self.apply_event(event);
        Ok(())
    }

    fn check_event(&self, event: &JournalEvent) -> Result<(), StorageError> {
        match event {
            JournalEvent::TranscriptCreated { record } => {
                record.validate()?;
                if self.transcripts.contains_key(&record.student_id) {
                    return Err(StorageError::DuplicateKey {
                        table: "transcripts.student_id",
                        key: record.student_id.to_string(),
                    });
                }
                if let Some(missing) = record
                    .grades
                    .iter()
                    .find(|h| !self.grades.contains_key(*h))
                {
                    return Err(StorageError::ForeignKeyViolation {
                        table: "transcripts.grades",
                        key: missing.to_string(),
                    });
                }
            }
            JournalEvent::GradeCreated { record, .. } => {
                record.validate()?;
                if self.grades.contains_key(&record.handle) {
                    return Err(StorageError::DuplicateKey {
                        table: "grades.handle",
                        key: record.handle.to_string(),
                    });
                }
            }
            JournalEvent::GradeAppended { student_id, handle } => {
                if !self.transcripts.contains_key(student_id) {
                    return Err(StorageError::ForeignKeyViolation {
                        table: "transcripts.student_id",
                        key: student_id.to_string(),
                    });
                }
                if !self.grades.contains_key(handle) {
                    return Err(StorageError::ForeignKeyViolation {
                        table: "transcripts.grades",
                        key: handle.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn apply_event(&mut self, event: JournalEvent) {
        match event {
            JournalEvent::TranscriptCreated { record } => {
                self.transcripts.insert(record.student_id, record);
            }
            JournalEvent::GradeCreated { seq, record } => {
                self.next_grade_seq = self.next_grade_seq.max(seq.saturating_add(1));
                self.grades.insert(record.handle.clone(), record);
            }
            JournalEvent::GradeAppended { student_id, handle } => {
                if let Some(transcript) = self.transcripts.get_mut(&student_id) {
                    transcript.grades.push(handle);
                }
            }
        }
    }

    pub fn insert_transcript(&mut self, record: TranscriptRecord) -> Result<(), StorageError> {
        self.commit(JournalEvent::TranscriptCreated { record })
    }

    pub fn transcript(&self, student_id: StudentId) -> Option<&TranscriptRecord> {
        self.transcripts.get(&student_id)
    }

    pub fn transcripts(&self) -> &BTreeMap<StudentId, TranscriptRecord> {
        &self.transcripts
    }

    pub fn transcripts_by_name(&self, name: &StudentName) -> Vec<&TranscriptRecord> {
        self.transcripts
            .values()
            .filter(|t| &t.student_name == name)
            .collect()
    }

    pub fn transcripts_projected(
        &self,
        projection: TranscriptProjection,
    ) -> Vec<TranscriptProjected> {
        self.transcripts
            .values()
            .map(|t| TranscriptProjected::from_record(t, projection))
            .collect()
    }

    pub fn max_student_id(&self) -> Option<StudentId> {
        self.transcripts.keys().next_back().copied()
    }

    /// Appends `handle` to the transcript's grade list. `Ok(false)` when the
    /// transcript does not exist.
    pub fn push_grade_handle(
        &mut self,
        student_id: StudentId,
        handle: GradeHandle,
    ) -> Result<bool, StorageError> {
        if !self.transcripts.contains_key(&student_id) {
            return Ok(false);
        }
        self.commit(JournalEvent::GradeAppended { student_id, handle })?;
        Ok(true)
    }

    pub fn insert_grade(
        &mut self,
        course: Course,
        grade: GradeValue,
    ) -> Result<GradeHandle, StorageError> {
        let seq = self.next_grade_seq;
        let handle = GradeHandle::from_seq(seq);
        let record = GradeRecord::v1(handle.clone(), course, grade);
        self.commit(JournalEvent::GradeCreated { seq, record })?;
        Ok(handle)
    }

    pub fn grade(&self, handle: &GradeHandle) -> Option<&GradeRecord> {
        self.grades.get(handle)
    }

    pub fn grades(&self) -> &BTreeMap<GradeHandle, GradeRecord> {
        &self.grades
    }
}
