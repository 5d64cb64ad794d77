#![forbid(unsafe_code)]

pub mod common;
pub mod grade;
pub mod student;

pub use common::{ContractViolation, SchemaVersion, Validate};
pub use grade::{Course, GradeEntry, GradeHandle, GradeValue};
pub use student::{StudentId, StudentName};
