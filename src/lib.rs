pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod report;
pub mod seed;

pub use config::{Config, ReportFormat};
pub use db::{init_db, IntegrityReport, LoadSummary, Repository};
pub use domain::{Average, Grade, NewGrade, NewStudent, Score, Student, StudentId};
pub use error::{AppError, ConstraintKind};
pub use report::{run_reports, ReportParams, ReportSet};
pub use seed::{SeedData, SeedError};
