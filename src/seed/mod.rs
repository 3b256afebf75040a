//! Sample data and the idempotent loader.
//!
//! The bundled data set ships as two CSV files embedded in the binary:
//! - `students.csv` - `full_name,birth_year`
//! - `grades.csv` - `full_name,subject,score`
//!
//! Grades name their owner by `full_name`, so names must be unique within a
//! seed set.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::db::{LoadSummary, Repository};
use crate::domain::{GradeEntry, NewStudent, RosterEntry, Score};
use crate::error::AppError;

const STUDENTS_FILE: &str = "students.csv";
const GRADES_FILE: &str = "grades.csv";

static BUNDLED_STUDENTS: &str = include_str!("students.csv");
static BUNDLED_GRADES: &str = include_str!("grades.csv");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("{file}: {message}")]
    Csv { file: &'static str, message: String },
    #[error("{file} line {line}: {message}")]
    InvalidRow {
        file: &'static str,
        line: usize,
        message: String,
    },
}

/// A parsed, validated seed set ready to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    roster: Vec<RosterEntry>,
}

impl SeedData {
    /// The sample data set compiled into the crate.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::parse(BUNDLED_STUDENTS.as_bytes(), BUNDLED_GRADES.as_bytes())
    }

    /// Read `students.csv` and `grades.csv` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, SeedError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read(&path).map_err(|e| SeedError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };
        let students = read(STUDENTS_FILE)?;
        let grades = read(GRADES_FILE)?;
        Self::parse(&students, &grades)
    }

    /// Parse and validate both CSV documents.
    ///
    /// Rows are rejected when a name or subject is blank, a student name
    /// repeats, a score is outside [1, 100], or a grade names an unknown
    /// student.
    pub fn parse(students_csv: &[u8], grades_csv: &[u8]) -> Result<Self, SeedError> {
        #[derive(Debug, serde::Deserialize)]
        struct StudentRow {
            full_name: String,
            birth_year: i64,
        }

        #[derive(Debug, serde::Deserialize)]
        struct GradeRow {
            full_name: String,
            subject: String,
            score: i64,
        }

        let mut roster: Vec<RosterEntry> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut seen_grades: HashSet<(usize, String, Score)> = HashSet::new();

        for (idx, record) in reader(students_csv).deserialize::<StudentRow>().enumerate() {
            let line = idx + 2;
            let row = record.map_err(|e| SeedError::Csv {
                file: STUDENTS_FILE,
                message: e.to_string(),
            })?;

            if row.full_name.is_empty() {
                return Err(invalid(STUDENTS_FILE, line, "full_name is empty".to_string()));
            }
            if by_name.contains_key(&row.full_name) {
                return Err(invalid(
                    STUDENTS_FILE,
                    line,
                    format!("duplicate student {}", row.full_name),
                ));
            }

            by_name.insert(row.full_name.clone(), roster.len());
            roster.push(RosterEntry::new(NewStudent::new(row.full_name, row.birth_year)));
        }

        for (idx, record) in reader(grades_csv).deserialize::<GradeRow>().enumerate() {
            let line = idx + 2;
            let row = record.map_err(|e| SeedError::Csv {
                file: GRADES_FILE,
                message: e.to_string(),
            })?;

            if row.subject.is_empty() {
                return Err(invalid(GRADES_FILE, line, "subject is empty".to_string()));
            }
            let score =
                Score::new(row.score).map_err(|e| invalid(GRADES_FILE, line, e.to_string()))?;
            let Some(&owner) = by_name.get(&row.full_name) else {
                return Err(invalid(
                    GRADES_FILE,
                    line,
                    format!("unknown student {}", row.full_name),
                ));
            };
            if !seen_grades.insert((owner, row.subject.clone(), score)) {
                return Err(invalid(
                    GRADES_FILE,
                    line,
                    format!("duplicate grade {} {} {}", row.full_name, row.subject, score),
                ));
            }

            roster[owner].grades.push(GradeEntry {
                subject: row.subject,
                score,
            });
        }

        Ok(SeedData { roster })
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn student_count(&self) -> usize {
        self.roster.len()
    }

    pub fn grade_count(&self) -> usize {
        self.roster.iter().map(|e| e.grades.len()).sum()
    }
}

/// Load a seed set, skipping rows that already exist.
///
/// Running this any number of times leaves exactly one copy of each row.
pub async fn load(repo: &Repository, seed: &SeedData) -> Result<LoadSummary, AppError> {
    info!(
        students = seed.student_count(),
        grades = seed.grade_count(),
        "Loading seed data"
    );
    let summary = repo.insert_roster(seed.roster()).await?;
    Ok(summary)
}

/// Load the seed set in `dir`, or the bundled one when `dir` is `None`.
pub async fn load_source(repo: &Repository, dir: Option<&Path>) -> Result<LoadSummary, AppError> {
    let seed = match dir {
        Some(dir) => SeedData::from_dir(dir)?,
        None => SeedData::bundled()?,
    };
    load(repo, &seed).await
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

fn invalid(file: &'static str, line: usize, message: String) -> SeedError {
    SeedError::InvalidRow {
        file,
        line,
        message,
    }
}
