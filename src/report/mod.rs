//! Runs the reporting queries and renders their results.

pub mod render;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::repo::{ClassSummary, ScoreRow, StudentAverageRow, SubjectAverageRow};
use crate::db::Repository;
use crate::domain::Student;
use crate::error::AppError;

pub use render::Tabular;

/// Parameters for one run of the query set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParams {
    pub student_name: String,
    pub born_after: i64,
    pub top_n: i64,
    pub score_below: i64,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            student_name: "Alice Johnson".to_string(),
            born_after: 2004,
            top_n: 3,
            score_below: 80,
        }
    }
}

impl From<&Config> for ReportParams {
    fn from(config: &Config) -> Self {
        Self {
            student_name: config.report_student.clone(),
            born_after: config.born_after,
            top_n: config.top_n,
            score_below: config.score_below,
        }
    }
}

/// Results of every report, in the order they are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSet {
    pub student_grades: Vec<ScoreRow>,
    pub student_averages: Vec<StudentAverageRow>,
    pub students_born_after: Vec<Student>,
    pub subject_averages: Vec<SubjectAverageRow>,
    pub top_students: Vec<StudentAverageRow>,
    pub scores_below: Vec<ScoreRow>,
    pub class_summary: ClassSummary,
}

/// Execute the query set against committed data.
pub async fn run_reports(repo: &Repository, params: &ReportParams) -> Result<ReportSet, AppError> {
    let student_name = match repo.find_student(&params.student_name).await? {
        Some(student) => student.full_name,
        None => {
            warn!(student = %params.student_name, "Report student not found");
            params.student_name.clone()
        }
    };

    let reports = ReportSet {
        student_grades: repo.grades_for_student(&student_name).await?,
        student_averages: repo.student_averages().await?,
        students_born_after: repo.students_born_after(params.born_after).await?,
        subject_averages: repo.subject_averages().await?,
        top_students: repo.top_students(params.top_n).await?,
        scores_below: repo.scores_below(params.score_below).await?,
        class_summary: repo.class_summary().await?,
    };

    info!(
        student_grades = reports.student_grades.len(),
        students_born_after = reports.students_born_after.len(),
        top_students = reports.top_students.len(),
        scores_below = reports.scores_below.len(),
        "Reports generated"
    );
    Ok(reports)
}
