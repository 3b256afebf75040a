//! Domain types for the gradebook.
//!
//! This module provides:
//! - Key newtypes and the validated `Score`
//! - Student and Grade records, stored and pending
//! - Roster entries grouping a student with the grades to load
//! - `Average`, the rounded mean used by every aggregate report

pub mod average;
pub mod grade;
pub mod primitives;
pub mod roster;
pub mod student;

pub use average::Average;
pub use grade::{Grade, NewGrade};
pub use primitives::{GradeId, Score, ScoreOutOfRange, StudentId, SCORE_MAX, SCORE_MIN};
pub use roster::{GradeEntry, RosterEntry};
pub use student::{NewStudent, Student};
