#![forbid(unsafe_code)]

use transcript_contracts::{Course, GradeValue, StudentId, StudentName};
use transcript_storage::{
    GradeRecordRepo, StorageError, TranscriptDocStore, TranscriptProjection, TranscriptRecord,
    TranscriptRecordRepo,
};

fn name(s: &str) -> StudentName {
    StudentName::new(s).unwrap()
}

fn store_with_students(names: &[&str]) -> TranscriptDocStore {
    let mut s = TranscriptDocStore::new_in_memory();
    for (idx, n) in names.iter().enumerate() {
        s.create_transcript_row(TranscriptRecord::v1(StudentId(idx as u64), name(n)))
            .unwrap();
    }
    s
}

#[test]
fn at_transcripts_db_01_student_id_is_unique() {
    let mut s = store_with_students(&["Ada"]);
    let err = s
        .create_transcript_row(TranscriptRecord::v1(StudentId(0), name("Grace")))
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::DuplicateKey {
            table: "transcripts.student_id",
            ..
        }
    ));
    assert_eq!(s.transcript_row(StudentId(0)).unwrap().student_name, name("Ada"));
    assert_eq!(s.transcript_row_count(), 1);
}

#[test]
fn at_transcripts_db_02_find_by_name_is_exact_and_keeps_duplicates() {
    let s = store_with_students(&["John Smith", "Jane Doe", "John Smith", "john smith"]);
    let ids: Vec<StudentId> = s
        .transcript_rows_by_name(&name("John Smith"))
        .into_iter()
        .map(|t| t.student_id)
        .collect();
    assert_eq!(ids, vec![StudentId(0), StudentId(2)]);
    assert!(s.transcript_rows_by_name(&name("John")).is_empty());
}

#[test]
fn at_transcripts_db_03_max_student_id_tracks_highest_key() {
    let mut s = TranscriptDocStore::new_in_memory();
    assert_eq!(TranscriptRecordRepo::max_student_id(&s), None);
    s.create_transcript_row(TranscriptRecord::v1(StudentId(7), name("A")))
        .unwrap();
    s.create_transcript_row(TranscriptRecord::v1(StudentId(3), name("B")))
        .unwrap();
    assert_eq!(TranscriptRecordRepo::max_student_id(&s), Some(StudentId(7)));
}

#[test]
fn at_transcripts_db_04_append_grade_handle_preserves_order() {
    let mut s = store_with_students(&["Ada"]);
    let first = s
        .create_grade_row(Course::new("Math 101").unwrap(), GradeValue::new("A").unwrap())
        .unwrap();
    let second = s
        .create_grade_row(
            Course::new("Physics 201").unwrap(),
            GradeValue::new("B+").unwrap(),
        )
        .unwrap();
    assert!(s.append_grade_handle(StudentId(0), first.clone()).unwrap());
    assert!(s.append_grade_handle(StudentId(0), second.clone()).unwrap());
    assert_eq!(
        s.transcript_row(StudentId(0)).unwrap().grades,
        vec![first, second]
    );
}

#[test]
fn at_transcripts_db_05_append_to_absent_transcript_reports_absent() {
    let mut s = TranscriptDocStore::new_in_memory();
    let handle = s
        .create_grade_row(Course::new("Math").unwrap(), GradeValue::new("A").unwrap())
        .unwrap();
    assert!(!s.append_grade_handle(StudentId(42), handle).unwrap());
}

#[test]
fn at_transcripts_db_06_projected_ids_cover_every_row() {
    let s = store_with_students(&["A", "B", "C"]);
    let ids: Vec<StudentId> = s
        .transcript_rows_projected(TranscriptProjection::STUDENT_ID_ONLY)
        .into_iter()
        .filter_map(|row| row.student_id)
        .collect();
    assert_eq!(ids, vec![StudentId(0), StudentId(1), StudentId(2)]);
}
