//! Domain primitives: StudentId, GradeId, Score.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auto-assigned key of a student row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub i64);

impl StudentId {
    pub fn new(id: i64) -> Self {
        StudentId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Auto-assigned key of a grade row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeId(pub i64);

impl GradeId {
    pub fn new(id: i64) -> Self {
        GradeId(id)
    }
}

/// Lowest accepted score (inclusive).
pub const SCORE_MIN: i64 = 1;
/// Highest accepted score (inclusive).
pub const SCORE_MAX: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("score {0} is outside [{}, {}]", SCORE_MIN, SCORE_MAX)]
pub struct ScoreOutOfRange(pub i64);

/// A subject score in `[SCORE_MIN, SCORE_MAX]`.
///
/// The `grades` table enforces the same range with a CHECK constraint; this
/// type lets sample data be rejected before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(i64);

impl Score {
    pub fn new(value: i64) -> Result<Self, ScoreOutOfRange> {
        if (SCORE_MIN..=SCORE_MAX).contains(&value) {
            Ok(Score(value))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
