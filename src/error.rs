use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::seed::SeedError;

/// Which table constraint the store rejected a write with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Check,
    ForeignKey,
    Unique,
    NotNull,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Check => write!(f, "check"),
            ConstraintKind::ForeignKey => write!(f, "foreign key"),
            ConstraintKind::Unique => write!(f, "unique"),
            ConstraintKind::NotNull => write!(f, "not null"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },
    #[error("Database error: {0}")]
    Database(String),
    #[error("Report rendering failed: {0}")]
    Render(String),
}

impl AppError {
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            AppError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let kind = match db_err.kind() {
                ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                _ => None,
            };
            if let Some(kind) = kind {
                return AppError::Constraint {
                    kind,
                    message: db_err.message().to_string(),
                };
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Render(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Render(err.to_string())
    }
}
