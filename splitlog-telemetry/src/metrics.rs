//! ## splitlog-telemetry::metrics
//! **Prometheus counter of log entries per severity level**
//!
//! One `IntCounterVec` per logger, named
//! `<namespace>_logger_<name>_entries_total` with a single `level` label.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use splitlog_core::Counter;
use thiserror::Error;
use tracing::warn;

pub const METRIC_NAME: &str = "entries_total";
pub const LEVEL_LABEL: &str = "level";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("metrics error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("metrics output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Counts log entries per level for one logger.
#[derive(Debug, Clone)]
pub struct LevelCounter {
    counter: IntCounterVec,
}

impl LevelCounter {
    /// Creates the counter without registering it anywhere.
    pub fn new(namespace: &str, logger_name: &str) -> Result<Self, TelemetryError> {
        let opts = Opts::new(METRIC_NAME, "Number of log entries for each severity level.")
            .namespace(namespace)
            .subsystem(format!("logger_{logger_name}"));
        let counter = IntCounterVec::new(opts, &[LEVEL_LABEL])?;
        Ok(Self { counter })
    }

    /// Creates the counter and registers it, failing on a duplicate registration.
    pub fn register(
        registry: &Registry,
        namespace: &str,
        logger_name: &str,
    ) -> Result<Self, TelemetryError> {
        let counter = Self::new(namespace, logger_name)?;
        registry.register(Box::new(counter.counter.clone()))?;
        Ok(counter)
    }

    /// Like [`register`](Self::register), but a conflict is logged and yields `None`
    /// so the logger can be built without a counter.
    pub fn register_or_skip(
        registry: &Registry,
        namespace: &str,
        logger_name: &str,
    ) -> Option<Self> {
        match Self::register(registry, namespace, logger_name) {
            Ok(counter) => Some(counter),
            Err(err) => {
                warn!(logger = logger_name, error = %err, "failed to register level counter, continuing without it");
                None
            }
        }
    }

    /// Current value for `label`.
    pub fn count(&self, label: &str) -> u64 {
        self.counter.with_label_values(&[label]).get()
    }
}

impl Counter for LevelCounter {
    fn increment(&self, label: &str) {
        self.counter.with_label_values(&[label]).inc();
    }
}

/// Renders every metric in `registry` in the Prometheus text format.
pub fn gather(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::<u8>::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
