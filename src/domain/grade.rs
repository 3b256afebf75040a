//! Grade records.

use crate::domain::{GradeId, StudentId};
use serde::{Deserialize, Serialize};

/// A stored grade. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub subject: String,
    pub score: i64,
}

/// A grade that has not been inserted yet.
///
/// `score` is passed to the store unchecked: the `grades` CHECK constraint
/// and the foreign key on `student_id` are the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
    pub student_id: StudentId,
    pub subject: String,
    pub score: i64,
}

impl NewGrade {
    pub fn new(student_id: StudentId, subject: impl Into<String>, score: i64) -> Self {
        Self {
            student_id,
            subject: subject.into(),
            score,
        }
    }
}
