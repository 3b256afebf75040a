//! JSON and CSV rendering of a [`ReportSet`].

use crate::config::ReportFormat;
use crate::db::repo::{ClassSummary, ScoreRow, StudentAverageRow, SubjectAverageRow};
use crate::domain::{Average, Student};
use crate::error::AppError;

use super::ReportSet;

/// A row type that can be written as one CSV record.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn record(&self) -> Vec<String>;
}

impl Tabular for ScoreRow {
    fn headers() -> &'static [&'static str] {
        &["full_name", "subject", "score"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.full_name.clone(),
            self.subject.clone(),
            self.score.to_string(),
        ]
    }
}

impl Tabular for StudentAverageRow {
    fn headers() -> &'static [&'static str] {
        &["student_id", "full_name", "average"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.student_id.to_string(),
            self.full_name.clone(),
            self.average.to_fixed_string(),
        ]
    }
}

impl Tabular for Student {
    fn headers() -> &'static [&'static str] {
        &["id", "full_name", "birth_year"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            self.birth_year.to_string(),
        ]
    }
}

impl Tabular for SubjectAverageRow {
    fn headers() -> &'static [&'static str] {
        &["subject", "average"]
    }

    fn record(&self) -> Vec<String> {
        vec![self.subject.clone(), self.average.to_fixed_string()]
    }
}

impl Tabular for ClassSummary {
    fn headers() -> &'static [&'static str] {
        &[
            "student_count",
            "grade_count",
            "graded_student_count",
            "max_average",
            "min_average",
            "overall_average",
        ]
    }

    fn record(&self) -> Vec<String> {
        let avg = |a: Option<Average>| a.map(|a| a.to_fixed_string()).unwrap_or_default();
        vec![
            self.student_count.to_string(),
            self.grade_count.to_string(),
            self.graded_student_count.to_string(),
            avg(self.max_average),
            avg(self.min_average),
            avg(self.overall_average),
        ]
    }
}

impl ReportSet {
    pub fn render(&self, format: ReportFormat) -> Result<String, AppError> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Csv => self.to_csv(),
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One `[name]` section per report, separated by blank lines.
    pub fn to_csv(&self) -> Result<String, AppError> {
        let sections = [
            section("student_grades", &self.student_grades)?,
            section("student_averages", &self.student_averages)?,
            section("students_born_after", &self.students_born_after)?,
            section("subject_averages", &self.subject_averages)?,
            section("top_students", &self.top_students)?,
            section("scores_below", &self.scores_below)?,
            section("class_summary", std::slice::from_ref(&self.class_summary))?,
        ];
        Ok(sections.join("\n"))
    }
}

fn section<T: Tabular>(name: &str, rows: &[T]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Render(e.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|e| AppError::Render(e.to_string()))?;
    Ok(format!("[{}]\n{}", name, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StudentId;

    fn sample() -> ReportSet {
        let alice_avg = Average::from_totals(265, 3).unwrap();
        ReportSet {
            student_grades: vec![ScoreRow {
                full_name: "Alice Johnson".to_string(),
                subject: "Math".to_string(),
                score: 88,
            }],
            student_averages: vec![StudentAverageRow {
                student_id: StudentId::new(1),
                full_name: "Alice Johnson".to_string(),
                average: alice_avg,
            }],
            students_born_after: vec![Student {
                id: StudentId::new(1),
                full_name: "Alice Johnson".to_string(),
                birth_year: 2005,
            }],
            subject_averages: vec![SubjectAverageRow {
                subject: "Math".to_string(),
                average: Average::from_totals(88, 1).unwrap(),
            }],
            top_students: vec![],
            scores_below: vec![ScoreRow {
                full_name: "O'Neil, Pat".to_string(),
                subject: "Art".to_string(),
                score: 61,
            }],
            class_summary: ClassSummary {
                student_count: 1,
                grade_count: 3,
                graded_student_count: 1,
                max_average: Some(alice_avg),
                min_average: Some(alice_avg),
                overall_average: None,
            },
        }
    }

    #[test]
    fn csv_has_every_section_in_order() {
        let csv = sample().to_csv().unwrap();
        let markers: Vec<_> = csv.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(
            markers,
            vec![
                "[student_grades]",
                "[student_averages]",
                "[students_born_after]",
                "[subject_averages]",
                "[top_students]",
                "[scores_below]",
                "[class_summary]",
            ]
        );
    }

    #[test]
    fn csv_formats_averages_and_quotes_fields() {
        let csv = sample().to_csv().unwrap();
        assert!(csv.contains("1,Alice Johnson,88.33\n"));
        assert!(csv.contains("Math,88.00\n"));
        assert!(csv.contains("\"O'Neil, Pat\",Art,61\n"));
        assert!(csv.contains("1,3,1,88.33,88.33,\n"));
    }

    #[test]
    fn csv_empty_section_keeps_headers() {
        let csv = sample().to_csv().unwrap();
        assert!(csv.contains("[top_students]\nstudent_id,full_name,average\n\n"));
    }

    #[test]
    fn json_contains_numbers_and_nulls() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["student_grades"][0]["score"], 88);
        assert_eq!(value["student_averages"][0]["average"].as_f64(), Some(88.33));
        assert_eq!(value["students_born_after"][0]["birth_year"], 2005);
        assert!(value["class_summary"]["overall_average"].is_null());
        assert_eq!(value["top_students"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn render_dispatches_on_format() {
        let reports = sample();
        assert!(reports.render(ReportFormat::Json).unwrap().starts_with('{'));
        assert!(reports
            .render(ReportFormat::Csv)
            .unwrap()
            .starts_with("[student_grades]"));
    }
}
