#![forbid(unsafe_code)]

use std::fs;
use std::io::Write;

use transcript_contracts::{Course, GradeValue, StudentId, StudentName};
use transcript_storage::{
    GradeRecordRepo, StorageError, TranscriptDocStore, TranscriptRecord, TranscriptRecordRepo,
};

#[test]
fn at_journal_db_01_writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/store.jsonl");

    let handle = {
        let mut s = TranscriptDocStore::open_journaled(&path).unwrap();
        assert!(s.is_journaled());
        s.create_transcript_row(TranscriptRecord::v1(
            StudentId(0),
            StudentName::new("Ada").unwrap(),
        ))
        .unwrap();
        let handle = s
            .create_grade_row(Course::new("Math 101").unwrap(), GradeValue::new("A").unwrap())
            .unwrap();
        assert!(s.append_grade_handle(StudentId(0), handle.clone()).unwrap());
        handle
    };

    let mut reopened = TranscriptDocStore::open_journaled(&path).unwrap();
    let transcript = reopened.transcript_row(StudentId(0)).unwrap();
    assert_eq!(transcript.student_name.as_str(), "Ada");
    assert_eq!(transcript.grades, vec![handle.clone()]);
    assert_eq!(reopened.grade_row(&handle).unwrap().grade.as_str(), "A");

    // The handle sequence resumes past replayed grades.
    let next = reopened
        .create_grade_row(Course::new("Art").unwrap(), GradeValue::new("B").unwrap())
        .unwrap();
    assert_ne!(next, handle);
}

#[test]
fn at_journal_db_02_rejected_write_is_not_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    {
        let mut s = TranscriptDocStore::open_journaled(&path).unwrap();
        s.create_transcript_row(TranscriptRecord::v1(
            StudentId(0),
            StudentName::new("Ada").unwrap(),
        ))
        .unwrap();
        let dup = s.create_transcript_row(TranscriptRecord::v1(
            StudentId(0),
            StudentName::new("Grace").unwrap(),
        ));
        assert!(dup.is_err());
    }
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    let reopened = TranscriptDocStore::open_journaled(&path).unwrap();
    assert_eq!(reopened.transcript_row_count(), 1);
}

#[test]
fn at_journal_db_03_unknown_schema_version_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"{{"schema_version":9,"event":{{"kind":"grade_appended","student_id":0,"handle":"000000000000000000000001"}}}}"#
    )
    .unwrap();
    drop(file);

    let err = TranscriptDocStore::open_journaled(&path).unwrap_err();
    match err {
        StorageError::Journal(msg) => assert!(msg.contains("schema_version=9")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn at_journal_db_04_corrupt_line_reports_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    fs::write(&path, "\nnot json\n").unwrap();

    let err = TranscriptDocStore::open_journaled(&path).unwrap_err();
    match err {
        StorageError::Journal(msg) => assert!(msg.contains("line 2")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn at_journal_db_05_failed_journal_write_leaves_no_in_memory_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    let mut s = TranscriptDocStore::open_journaled(&path).unwrap();

    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let err = s
        .create_transcript_row(TranscriptRecord::v1(
            StudentId(0),
            StudentName::new("Ada").unwrap(),
        ))
        .unwrap_err();
    assert!(matches!(err, StorageError::Journal(_)));
    assert_eq!(s.transcript_row_count(), 0);
    assert!(s.transcript_row(StudentId(0)).is_none());

    let grade = s.create_grade_row(
        Course::new("Math 101").unwrap(),
        GradeValue::new("A").unwrap(),
    );
    assert!(matches!(grade, Err(StorageError::Journal(_))));
    assert!(s.grade_handles().is_empty());
}

#[test]
fn at_journal_db_06_unterminated_final_line_is_dropped_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.jsonl");
    {
        let mut s = TranscriptDocStore::open_journaled(&path).unwrap();
        s.create_transcript_row(TranscriptRecord::v1(
            StudentId(0),
            StudentName::new("Ada").unwrap(),
        ))
        .unwrap();
    }
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"schema_version":1,"event":{"kind":"transcr"#)
        .unwrap();
    drop(file);

    {
        let mut s = TranscriptDocStore::open_journaled(&path).unwrap();
        assert_eq!(s.transcript_row_count(), 1);
        s.create_transcript_row(TranscriptRecord::v1(
            StudentId(1),
            StudentName::new("Grace").unwrap(),
        ))
        .unwrap();
    }

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.ends_with('\n'));
    let reopened = TranscriptDocStore::open_journaled(&path).unwrap();
    assert_eq!(reopened.transcript_row_count(), 2);
    assert_eq!(
        reopened.transcript_row(StudentId(1)).unwrap().student_name.as_str(),
        "Grace"
    );
}
