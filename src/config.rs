use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub seed: bool,
    pub seed_dir: Option<PathBuf>,
    pub report_student: String,
    pub born_after: i64,
    pub top_n: i64,
    pub score_below: i64,
    pub report_format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("DATABASE_PATH")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let seed = match env_map
            .get("SEED")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
            .unwrap_or("true")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SEED".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let seed_dir = env_map
            .get("SEED_DIR")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let report_student = env_map
            .get("REPORT_STUDENT")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "Alice Johnson".to_string());
        if report_student.is_empty() {
            return Err(ConfigError::InvalidValue(
                "REPORT_STUDENT".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let born_after = parse_i64(&env_map, "BORN_AFTER", "2004")?;

        let top_n = parse_i64(&env_map, "TOP_N", "3")?;
        if top_n < 1 {
            return Err(ConfigError::InvalidValue(
                "TOP_N".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let score_below = parse_i64(&env_map, "SCORE_BELOW", "80")?;

        let report_format = match env_map
            .get("REPORT_FORMAT")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
            .unwrap_or("json")
        {
            "json" => ReportFormat::Json,
            "csv" => ReportFormat::Csv,
            other => {
                return Err(ConfigError::InvalidValue(
                    "REPORT_FORMAT".to_string(),
                    format!("must be json or csv, got {}", other),
                ))
            }
        };

        Ok(Config {
            database_path,
            seed,
            seed_dir,
            report_student,
            born_after,
            top_n,
            score_below,
            report_format,
        })
    }
}

fn parse_i64(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<i64, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .unwrap_or(default)
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a valid i64".to_string()))
}
