use splitlog_config::ConfigError;
use splitlog_core::LogError;
use splitlog_telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Log(#[from] LogError),

    #[error("Metrics error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("Invalid field '{0}', expected KEY=VALUE")]
    InvalidField(String),
}
