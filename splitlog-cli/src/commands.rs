use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use prometheus::Registry;
use serde_json::Value;
use splitlog_config::LogConfig;
use splitlog_core::{create_logger, Counter, Entry, Level, Severity, SinkRegistry};
use splitlog_telemetry::LevelCounter;
use tracing::debug;

use crate::error::CliError;

/// Namespace of the exported level counter.
pub const METRICS_NAMESPACE: &str = "splitlog";

#[derive(Parser, Debug)]
#[command(version, about = "Write one leveled JSON log entry to stdout or stderr")]
pub struct Cli {
    /// YAML configuration file (defaults to config/logging.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Logical logger name added to every record
    #[arg(short, long, default_value = "splitlog")]
    pub name: String,
    /// Minimum level for stdout: none, error, warn, info, debug
    #[arg(short, long)]
    pub level: Option<String>,
    /// Output format (only json is supported)
    #[arg(short, long)]
    pub format: Option<String>,
    /// Print the per-level counters after logging
    #[arg(long)]
    pub metrics: bool,
    /// Severity of the entry; unknown names are dropped
    pub severity: String,
    /// Entry fields as KEY=VALUE; values that parse as JSON keep their type
    pub fields: Vec<String>,
}

pub fn run_command(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => LogConfig::load_from_path(path)?,
        None => LogConfig::load()?,
    };
    if let Some(level) = &cli.level {
        config.level = level.clone();
    }
    if let Some(format) = &cli.format {
        config.format = format.clone();
    }
    debug!(?config, "resolved logging configuration");

    let sinks = SinkRegistry::stdio();
    let registry = Registry::new();
    emit(&cli, &config, &sinks, &registry)?;

    if cli.metrics {
        print!("{}", splitlog_telemetry::gather(&registry)?);
    }
    Ok(())
}

/// Logs the entry described by `cli` through a logger built on `sinks`.
pub fn emit(
    cli: &Cli,
    config: &LogConfig,
    sinks: &SinkRegistry,
    registry: &Registry,
) -> Result<(), CliError> {
    let counter = LevelCounter::register_or_skip(registry, METRICS_NAMESPACE, &cli.name)
        .map(|c| Arc::new(c) as Arc<dyn Counter>);
    let logger = create_logger(cli.name.clone(), counter, config, sinks);

    let mut entry = Entry::new().severity(parse_severity(&cli.severity));
    for field in &cli.fields {
        let (key, value) = parse_field(field)?;
        entry = entry.field(key, value);
    }
    logger.log(entry)?;
    Ok(())
}

fn parse_severity(raw: &str) -> Severity {
    raw.parse::<Level>()
        .map(Severity::from)
        .unwrap_or_else(|_| Severity::custom(raw))
}

fn parse_field(raw: &str) -> Result<(String, Value), CliError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CliError::InvalidField(raw.to_string()))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitlog_core::BufferWriter;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("splitlog").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_fields() {
        assert_eq!(parse_field("key=value").unwrap(), ("key".into(), Value::from("value")));
        assert_eq!(parse_field("n=42").unwrap(), ("n".into(), Value::from(42)));
        assert_eq!(parse_field("eq=a=b").unwrap(), ("eq".into(), Value::from("a=b")));
        assert!(matches!(parse_field("novalue"), Err(CliError::InvalidField(_))));
        assert!(matches!(parse_field("=x"), Err(CliError::InvalidField(_))));
    }

    #[test]
    fn unknown_severity_is_custom() {
        assert_eq!(parse_severity("ERROR"), Severity::from(Level::Error));
        assert_eq!(parse_severity("trace"), Severity::custom("trace"));
    }

    #[test]
    fn emits_error_to_stderr_and_counts() {
        let out = BufferWriter::new();
        let err = BufferWriter::new();
        let sinks = SinkRegistry::with_writers(out.clone(), err.clone());
        let registry = Registry::new();
        let args = cli(&["--name", "app", "error", "key=value"]);

        emit(&args, &LogConfig::with_level("warn"), &sinks, &registry).unwrap();

        assert!(out.is_empty());
        let record: Value = serde_json::from_str(&err.lines()[0]).unwrap();
        assert_eq!(record["key"], "value");
        assert_eq!(record["logger"], "app");
        let text = splitlog_telemetry::gather(&registry).unwrap();
        assert!(text.contains("splitlog_logger_app_entries_total{level=\"error\"} 1"));
    }

    #[test]
    fn none_level_writes_nothing() {
        let out = BufferWriter::new();
        let err = BufferWriter::new();
        let sinks = SinkRegistry::with_writers(out.clone(), err.clone());
        let args = cli(&["error", "key=value"]);

        emit(&args, &LogConfig::with_level("none"), &sinks, &Registry::new()).unwrap();

        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
