//! Read-only reporting queries.

use super::Repository;
use crate::domain::average::exact_mean;
use crate::domain::{Average, Student, StudentId};
use serde::Serialize;
use sqlx::Row;

/// A single `(student, subject, score)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRow {
    pub full_name: String,
    pub subject: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAverageRow {
    pub student_id: StudentId,
    pub full_name: String,
    pub average: Average,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAverageRow {
    pub subject: String,
    pub average: Average,
}

/// Class-wide statistics over per-student averages.
///
/// The average fields are `None` when no student has a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub student_count: i64,
    pub grade_count: i64,
    pub graded_student_count: i64,
    pub max_average: Option<Average>,
    pub min_average: Option<Average>,
    pub overall_average: Option<Average>,
}

struct StudentTotals {
    student_id: StudentId,
    full_name: String,
    total: i64,
    count: i64,
}

impl Repository {
    /// Every grade of the student with exactly this name, in insertion order.
    pub async fn grades_for_student(&self, full_name: &str) -> Result<Vec<ScoreRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT s.full_name, g.subject, g.score
            FROM grades g
            JOIN students s ON s.id = g.student_id
            WHERE s.full_name = ?
            ORDER BY g.id ASC
            "#,
        )
        .bind(full_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(score_row).collect())
    }

    /// Mean score per student, highest first.
    ///
    /// Students without grades are omitted. Equal means keep insertion order.
    pub async fn student_averages(&self) -> Result<Vec<StudentAverageRow>, sqlx::Error> {
        let totals = self.student_totals(None).await?;
        Ok(totals
            .into_iter()
            .map(StudentTotals::into_average_row)
            .collect())
    }

    /// Students born strictly after `year`, youngest cohort last.
    pub async fn students_born_after(&self, year: i64) -> Result<Vec<Student>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, birth_year
            FROM students
            WHERE birth_year > ?
            ORDER BY birth_year ASC, id ASC
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| Student {
                id: StudentId::new(r.get("id")),
                full_name: r.get("full_name"),
                birth_year: r.get("birth_year"),
            })
            .collect())
    }

    /// Mean score per subject, highest first.
    pub async fn subject_averages(&self) -> Result<Vec<SubjectAverageRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT subject, SUM(score) AS total, COUNT(*) AS n
            FROM grades
            GROUP BY subject
            ORDER BY AVG(score) DESC, subject ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| SubjectAverageRow {
                subject: r.get("subject"),
                average: Average::from_totals(r.get("total"), r.get("n")).unwrap_or_default(),
            })
            .collect())
    }

    /// The `limit` students with the highest mean score.
    ///
    /// Equal means are ranked by insertion order. A `limit` below 1 yields
    /// no rows.
    pub async fn top_students(&self, limit: i64) -> Result<Vec<StudentAverageRow>, sqlx::Error> {
        if limit < 1 {
            return Ok(Vec::new());
        }
        let totals = self.student_totals(Some(limit)).await?;
        Ok(totals
            .into_iter()
            .map(StudentTotals::into_average_row)
            .collect())
    }

    /// Distinct `(student, subject, score)` lines scoring below `cutoff`,
    /// ordered by name, then score.
    pub async fn scores_below(&self, cutoff: i64) -> Result<Vec<ScoreRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT s.full_name, g.subject, g.score
            FROM grades g
            JOIN students s ON s.id = g.student_id
            WHERE g.score < ?
            ORDER BY s.full_name ASC, g.score ASC, g.subject ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(score_row).collect())
    }

    /// Row counts plus max, min and mean of the per-student averages.
    ///
    /// Aggregates use exact per-student means and are rounded once at the end.
    pub async fn class_summary(&self) -> Result<ClassSummary, sqlx::Error> {
        let counts = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students) AS student_count,
                (SELECT COUNT(*) FROM grades) AS grade_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let means: Vec<_> = self
            .student_totals(None)
            .await?
            .iter()
            .filter_map(|t| exact_mean(t.total, t.count))
            .collect();

        let max_average = means.iter().max().copied().map(Average::new);
        let min_average = means.iter().min().copied().map(Average::new);
        let overall_average = if means.is_empty() {
            None
        } else {
            let sum: rust_decimal::Decimal = means.iter().copied().sum();
            Some(Average::new(sum / rust_decimal::Decimal::from(means.len() as i64)))
        };

        Ok(ClassSummary {
            student_count: counts.get("student_count"),
            grade_count: counts.get("grade_count"),
            graded_student_count: means.len() as i64,
            max_average,
            min_average,
            overall_average,
        })
    }

    /// Per-student score totals ordered by exact mean (desc), then id.
    ///
    /// `limit` of `None` returns every graded student.
    async fn student_totals(&self, limit: Option<i64>) -> Result<Vec<StudentTotals>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT s.id AS student_id, s.full_name, SUM(g.score) AS total, COUNT(g.id) AS n
            FROM students s
            JOIN grades g ON g.student_id = s.id
            GROUP BY s.id, s.full_name
            ORDER BY AVG(g.score) DESC, s.id ASC
            LIMIT ?
            "#,
        )
        // SQLite treats a negative LIMIT as unbounded.
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| StudentTotals {
                student_id: StudentId::new(r.get("student_id")),
                full_name: r.get("full_name"),
                total: r.get("total"),
                count: r.get("n"),
            })
            .collect())
    }
}

impl StudentTotals {
    fn into_average_row(self) -> StudentAverageRow {
        StudentAverageRow {
            student_id: self.student_id,
            full_name: self.full_name,
            average: Average::from_totals(self.total, self.count).unwrap_or_default(),
        }
    }
}

fn score_row(r: &sqlx::sqlite::SqliteRow) -> ScoreRow {
    ScoreRow {
        full_name: r.get("full_name"),
        subject: r.get("subject"),
        score: r.get("score"),
    }
}
