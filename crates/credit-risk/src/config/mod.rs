use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::workflows::decision::CostParameters;

/// Distinguishes runtime behavior for different stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the pipeline and decision layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub decision: DecisionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("CREDIT_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let excluded_columns = match env::var("EXCLUDED_COLUMNS") {
            Ok(raw) => parse_column_list(&raw),
            Err(_) => DataConfig::default_excluded_columns(),
        };

        let costs = CostParameters {
            cost_false_negative: env_f64("COST_FALSE_NEGATIVE", 10.0)?,
            cost_false_positive: env_f64("COST_FALSE_POSITIVE", 1.0)?,
            revenue_true_positive: env_f64("REVENUE_TRUE_POSITIVE", 5.0)?,
            value_true_negative: env_f64("VALUE_TRUE_NEGATIVE", 0.0)?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi_colors = environment == AppEnvironment::Development;

        Ok(Self {
            environment,
            data: DataConfig {
                data_dir: PathBuf::from(data_dir),
                excluded_columns,
            },
            decision: DecisionConfig {
                costs,
                threshold_step: env_f64("THRESHOLD_STEP", 0.01)?,
                default_threshold: env_f64("DEFAULT_THRESHOLD", 0.5)?,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi_colors,
            },
        })
    }
}

/// Where raw and processed tables live, and which columns never reach the model.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub excluded_columns: Vec<String>,
}

impl DataConfig {
    pub fn default_excluded_columns() -> Vec<String> {
        vec!["SK_ID_CURR".to_string(), "TARGET".to_string()]
    }
}

/// Business costs and grid settings for threshold selection.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    pub costs: CostParameters,
    pub threshold_step: f64,
    pub default_threshold: f64,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// ANSI colors, enabled only in development.
    pub ansi_colors: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber {
        key: &'static str,
        value: String,
        source: std::num::ParseFloatError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value, .. } => {
                write!(f, "{key} must be a number (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { source, .. } => Some(source),
        }
    }
}

fn env_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|source| ConfigError::InvalidNumber {
                key,
                value: raw.clone(),
                source,
            }),
        Err(_) => Ok(default),
    }
}

fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
