#![forbid(unsafe_code)]

use std::fmt;

use crate::common::validate_label;
use crate::{ContractViolation, Validate};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct StudentId(pub u64);

impl StudentId {
    pub const FIRST: StudentId = StudentId(0);

    pub fn next(self) -> StudentId {
        StudentId(self.0.saturating_add(1))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Student display name. Kept verbatim so name lookups stay exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentName(String);

impl StudentName {
    pub fn new(name: impl Into<String>) -> Result<Self, ContractViolation> {
        let name = Self(name.into());
        name.validate()?;
        Ok(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for StudentName {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_label("student_name", &self.0)
    }
}

impl TryFrom<String> for StudentName {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudentName> for String {
    fn from(value: StudentName) -> Self {
        value.0
    }
}

impl fmt::Display for StudentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
