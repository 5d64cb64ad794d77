#![forbid(unsafe_code)]

use transcript_contracts::{Course, GradeHandle, GradeValue};
use transcript_storage::{GradeRecordRepo, TranscriptDocStore};

#[test]
fn at_grades_db_01_create_then_resolve() {
    let mut s = TranscriptDocStore::new_in_memory();
    let handle = s
        .create_grade_row(Course::new("Math 101").unwrap(), GradeValue::new("95").unwrap())
        .unwrap();
    let row = s.grade_row(&handle).unwrap();
    assert_eq!(row.course.as_str(), "Math 101");
    assert_eq!(row.grade.as_str(), "95");
    assert_eq!(row.handle, handle);
}

#[test]
fn at_grades_db_02_unknown_handle_resolves_to_none() {
    let s = TranscriptDocStore::new_in_memory();
    assert!(s.grade_row(&GradeHandle::from_seq(1)).is_none());
}

#[test]
fn at_grades_db_03_grade_handles_lists_every_row() {
    let mut s = TranscriptDocStore::new_in_memory();
    let a = s
        .create_grade_row(Course::new("A").unwrap(), GradeValue::new("1").unwrap())
        .unwrap();
    let b = s
        .create_grade_row(Course::new("B").unwrap(), GradeValue::new("2").unwrap())
        .unwrap();
    assert_eq!(s.grade_handles(), vec![a, b]);
}
