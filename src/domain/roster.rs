//! A student together with the grades to load for them.

use crate::domain::{NewStudent, Score};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeEntry {
    pub subject: String,
    pub score: Score,
}

/// One student and their grades, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student: NewStudent,
    pub grades: Vec<GradeEntry>,
}

impl RosterEntry {
    pub fn new(student: NewStudent) -> Self {
        Self {
            student,
            grades: Vec::new(),
        }
    }
}
