#![forbid(unsafe_code)]

pub mod docstore;
pub mod journal;
pub mod repo;

pub use docstore::{
    GradeRecord, StorageError, TranscriptDocStore, TranscriptProjected, TranscriptProjection,
    TranscriptRecord,
};
pub use repo::{GradeRecordRepo, TranscriptRecordRepo};
