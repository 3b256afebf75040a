//! Student records.

use crate::domain::StudentId;
use serde::{Deserialize, Serialize};

/// A stored student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub birth_year: i64,
}

/// A student that has not been inserted yet.
///
/// `(full_name, birth_year)` is the natural key used for skip-if-exists loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewStudent {
    pub full_name: String,
    pub birth_year: i64,
}

impl NewStudent {
    pub fn new(full_name: impl Into<String>, birth_year: i64) -> Self {
        Self {
            full_name: full_name.into(),
            birth_year,
        }
    }
}
