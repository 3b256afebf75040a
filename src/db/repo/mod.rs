//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules:
//! - `mod.rs` - writes, lookups and integrity checks
//! - `reports.rs` - the read-only reporting queries

mod reports;

pub use reports::{ClassSummary, ScoreRow, StudentAverageRow, SubjectAverageRow};

use crate::domain::{Grade, GradeId, NewGrade, NewStudent, RosterEntry, Student, StudentId};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use tracing::{debug, info};

/// Rows written by a roster load. Zero on a repeated load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub students_inserted: usize,
    pub grades_inserted: usize,
}

/// Violations of the data model invariants found in stored rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub orphan_grades: i64,
    pub out_of_range_scores: i64,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_grades == 0 && self.out_of_range_scores == 0
    }
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial statement to check the store is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a student unless one with the same name and birth year exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_student(&self, student: &NewStudent) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_student_conn(&mut conn, student).await
    }

    /// Look up the id of a student by its natural key.
    pub async fn student_id(&self, student: &NewStudent) -> Result<Option<StudentId>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        student_id_conn(&mut conn, student).await
    }

    /// Insert a grade unless the identical `(student, subject, score)` row exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    /// Fails with a CHECK violation when the score is outside [1, 100] and a
    /// FOREIGN KEY violation when the student does not exist.
    pub async fn insert_grade(&self, grade: &NewGrade) -> Result<bool, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_grade_conn(&mut conn, grade).await
    }

    /// Insert students and their grades in a single transaction.
    ///
    /// Rows that already exist are skipped, so loading the same roster twice
    /// leaves the tables unchanged. Any constraint violation rolls back the
    /// whole batch.
    ///
    /// # Errors
    /// Returns an error if any statement or the commit fails.
    pub async fn insert_roster(&self, roster: &[RosterEntry]) -> Result<LoadSummary, sqlx::Error> {
        let mut summary = LoadSummary::default();
        if roster.is_empty() {
            return Ok(summary);
        }

        let mut tx = self.pool.begin().await?;

        for entry in roster {
            if insert_student_conn(&mut *tx, &entry.student).await? {
                summary.students_inserted += 1;
            }

            let student_id = student_id_conn(&mut *tx, &entry.student)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;

            for grade in &entry.grades {
                let new_grade = NewGrade::new(student_id, grade.subject.clone(), grade.score.as_i64());
                if insert_grade_conn(&mut *tx, &new_grade).await? {
                    summary.grades_inserted += 1;
                }
            }
        }

        tx.commit().await?;

        info!(
            students = roster.len(),
            students_inserted = summary.students_inserted,
            grades_inserted = summary.grades_inserted,
            "Roster loaded"
        );
        Ok(summary)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find a student by name, ignoring ASCII case.
    ///
    /// When several students share the name, the earliest inserted wins.
    pub async fn find_student(&self, full_name: &str) -> Result<Option<Student>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, birth_year
            FROM students
            WHERE full_name = ? COLLATE NOCASE
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(full_name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Student {
            id: StudentId::new(r.get("id")),
            full_name: r.get("full_name"),
            birth_year: r.get("birth_year"),
        }))
    }

    /// All students in insertion order.
    pub async fn list_students(&self) -> Result<Vec<Student>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, full_name, birth_year FROM students ORDER BY id ASC")
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

    /// All grades in insertion order.
    pub async fn list_grades(&self) -> Result<Vec<Grade>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT id, student_id, subject, score FROM grades ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .map(|r| Grade {
                id: GradeId::new(r.get("id")),
                student_id: StudentId::new(r.get("student_id")),
                subject: r.get("subject"),
                score: r.get("score"),
            })
            .collect())
    }

    /// Count grades without an owning student and scores outside [1, 100].
    ///
    /// Both are zero whenever foreign keys were enforced on every write.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*)
                 FROM grades g
                 LEFT JOIN students s ON s.id = g.student_id
                 WHERE s.id IS NULL) AS orphan_grades,
                (SELECT COUNT(*)
                 FROM grades
                 WHERE score < 1 OR score > 100) AS out_of_range_scores
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(IntegrityReport {
            orphan_grades: row.get("orphan_grades"),
            out_of_range_scores: row.get("out_of_range_scores"),
        })
    }
}

async fn insert_student_conn(
    conn: &mut SqliteConnection,
    student: &NewStudent,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO students (full_name, birth_year)
        VALUES (?, ?)
        ON CONFLICT(full_name, birth_year) DO NOTHING
        "#,
    )
    .bind(student.full_name.as_str())
    .bind(student.birth_year)
    .execute(&mut *conn)
    .await?;

    let inserted = result.rows_affected() > 0;
    if !inserted {
        debug!(full_name = %student.full_name, birth_year = student.birth_year, "Student exists, skipped");
    }
    Ok(inserted)
}

async fn student_id_conn(
    conn: &mut SqliteConnection,
    student: &NewStudent,
) -> Result<Option<StudentId>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM students WHERE full_name = ? AND birth_year = ?")
        .bind(student.full_name.as_str())
        .bind(student.birth_year)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(|r| StudentId::new(r.get("id"))))
}

async fn insert_grade_conn(
    conn: &mut SqliteConnection,
    grade: &NewGrade,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO grades (student_id, subject, score)
        SELECT ?, ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM grades
            WHERE student_id = ? AND subject = ? AND score = ?
        )
        "#,
    )
    .bind(grade.student_id.as_i64())
    .bind(grade.subject.as_str())
    .bind(grade.score)
    .bind(grade.student_id.as_i64())
    .bind(grade.subject.as_str())
    .bind(grade.score)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::{GradeEntry, Score};
    use crate::error::{AppError, ConstraintKind};
    use tempfile::TempDir;

    async fn setup() -> (Repository, SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool.clone()), pool, temp_dir)
    }

    fn entry(name: &str, birth_year: i64, grades: &[(&str, i64)]) -> RosterEntry {
        RosterEntry {
            student: NewStudent::new(name, birth_year),
            grades: grades
                .iter()
                .map(|(subject, score)| GradeEntry {
                    subject: subject.to_string(),
                    score: Score::new(*score).unwrap(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let (repo, _pool, _temp) = setup().await;
        repo.ping().await.expect("ping failed");
    }

    #[tokio::test]
    async fn test_insert_student_skips_existing() {
        let (repo, _pool, _temp) = setup().await;
        let student = NewStudent::new("Alice Johnson", 2005);

        assert!(repo.insert_student(&student).await.unwrap());
        assert!(!repo.insert_student(&student).await.unwrap());

        // Same name, different birth year is a different student.
        assert!(repo
            .insert_student(&NewStudent::new("Alice Johnson", 2006))
            .await
            .unwrap());

        assert_eq!(repo.list_students().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_grade_skips_identical_row() {
        let (repo, _pool, _temp) = setup().await;
        let student = NewStudent::new("Alice Johnson", 2005);
        repo.insert_student(&student).await.unwrap();
        let id = repo.student_id(&student).await.unwrap().unwrap();

        let grade = NewGrade::new(id, "Math", 88);
        assert!(repo.insert_grade(&grade).await.unwrap());
        assert!(!repo.insert_grade(&grade).await.unwrap());
        assert!(repo
            .insert_grade(&NewGrade::new(id, "Math", 90))
            .await
            .unwrap());

        assert_eq!(repo.list_grades().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_grade_score_out_of_range_fails_check() {
        let (repo, _pool, _temp) = setup().await;
        let student = NewStudent::new("Alice Johnson", 2005);
        repo.insert_student(&student).await.unwrap();
        let id = repo.student_id(&student).await.unwrap().unwrap();

        for score in [0, 101, -3] {
            let err = repo
                .insert_grade(&NewGrade::new(id, "Math", score))
                .await
                .unwrap_err();
            assert_eq!(
                AppError::from(err).constraint_kind(),
                Some(ConstraintKind::Check),
                "score {} should violate the check constraint",
                score
            );
        }

        assert!(repo.list_grades().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_grade_unknown_student_fails_foreign_key() {
        let (repo, _pool, _temp) = setup().await;

        let err = repo
            .insert_grade(&NewGrade::new(StudentId::new(999), "Math", 88))
            .await
            .unwrap_err();
        assert_eq!(
            AppError::from(err).constraint_kind(),
            Some(ConstraintKind::ForeignKey)
        );
    }

    #[tokio::test]
    async fn test_insert_roster_is_idempotent() {
        let (repo, _pool, _temp) = setup().await;
        let roster = vec![
            entry("Alice Johnson", 2005, &[("Math", 88), ("English", 92)]),
            entry("Brian Smith", 2004, &[("Math", 75)]),
        ];

        let first = repo.insert_roster(&roster).await.unwrap();
        assert_eq!(
            first,
            LoadSummary {
                students_inserted: 2,
                grades_inserted: 3
            }
        );

        let second = repo.insert_roster(&roster).await.unwrap();
        assert_eq!(second, LoadSummary::default());

        assert_eq!(repo.list_students().await.unwrap().len(), 2);
        assert_eq!(repo.list_grades().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_roster_empty() {
        let (repo, _pool, _temp) = setup().await;
        assert_eq!(repo.insert_roster(&[]).await.unwrap(), LoadSummary::default());
    }

    #[tokio::test]
    async fn test_find_student_ignores_case() {
        let (repo, _pool, _temp) = setup().await;
        repo.insert_student(&NewStudent::new("Alice Johnson", 2005))
            .await
            .unwrap();

        let found = repo.find_student("  alice JOHNSON ").await.unwrap().unwrap();
        assert_eq!(found.full_name, "Alice Johnson");
        assert_eq!(found.birth_year, 2005);

        assert!(repo.find_student("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_integrity_clean_after_roster_load() {
        let (repo, _pool, _temp) = setup().await;
        repo.insert_roster(&[entry("Alice Johnson", 2005, &[("Math", 88)])])
            .await
            .unwrap();

        let report = repo.check_integrity().await.unwrap();
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_check_integrity_counts_orphans_written_without_foreign_keys() {
        let (repo, pool, _temp) = setup().await;

        let mut conn = pool.acquire().await.unwrap();
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO grades (student_id, subject, score) VALUES (42, 'Math', 70)")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *conn)
            .await
            .unwrap();
        drop(conn);

        let report = repo.check_integrity().await.unwrap();
        assert_eq!(report.orphan_grades, 1);
        assert_eq!(report.out_of_range_scores, 0);
        assert!(!report.is_clean());
    }
}
