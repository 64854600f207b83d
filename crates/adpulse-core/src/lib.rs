mod app_config;
mod config;
pub mod report;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use report::{BatchReport, FetchOutcome};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
