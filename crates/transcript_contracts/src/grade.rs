#![forbid(unsafe_code)]

use std::fmt;

use crate::common::validate_label;
use crate::{ContractViolation, Validate};

pub const GRADE_HANDLE_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Course(String);

impl Course {
    pub fn new(course: impl Into<String>) -> Result<Self, ContractViolation> {
        let course = Self(course.into());
        course.validate()?;
        Ok(course)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for Course {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_label("course", &self.0)
    }
}

impl TryFrom<String> for Course {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Course> for String {
    fn from(value: Course) -> Self {
        value.0
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grade as recorded on a transcript. Letter grades and numeric scores share
/// the text form (`"B+"`, `"95"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GradeValue(String);

impl GradeValue {
    pub fn new(grade: impl Into<String>) -> Result<Self, ContractViolation> {
        let grade = Self(grade.into());
        grade.validate()?;
        Ok(grade)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for GradeValue {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_label("grade", &self.0)
    }
}

impl TryFrom<String> for GradeValue {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GradeValue> for String {
    fn from(value: GradeValue) -> Self {
        value.0
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned reference to a grade record: 24 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GradeHandle(String);

impl GradeHandle {
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("{seq:0width$x}", width = GRADE_HANDLE_LEN))
    }

    pub fn parse(raw: impl Into<String>) -> Result<Self, ContractViolation> {
        let handle = Self(raw.into());
        handle.validate()?;
        Ok(handle)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for GradeHandle {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.len() != GRADE_HANDLE_LEN {
            return Err(ContractViolation::InvalidValue {
                field: "grade_handle",
                reason: "must be exactly 24 chars",
            });
        }
        if !self
            .0
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(ContractViolation::InvalidValue {
                field: "grade_handle",
                reason: "must be lowercase hex",
            });
        }
        Ok(())
    }
}

impl TryFrom<String> for GradeHandle {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<GradeHandle> for String {
    fn from(value: GradeHandle) -> Self {
        value.0
    }
}

impl fmt::Display for GradeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grade resolved from its handle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradeEntry {
    pub course: Course,
    pub grade: GradeValue,
}

impl GradeEntry {
    pub fn new(course: Course, grade: GradeValue) -> Self {
        Self { course, grade }
    }
}
