//! Destination loggers: the JSON encoder over a shared sink and the level filter.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::entry::{Record, CALLER_KEY, LEVEL_KEY, LOGGER_KEY, TIMESTAMP_KEY};
use crate::error::LogError;
use crate::level::LevelSetting;
use crate::sink::SharedSink;

/// A logical output target for routed records.
pub trait Appender: Send + Sync {
    fn append(&self, record: &Record) -> Result<(), LogError>;
}

/// Record encoding. JSON is the only encoder; every format string resolves to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
}

impl Format {
    pub fn resolve(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => Format::Json,
            other => {
                debug!(format = other, "unsupported log format, using json");
                Format::Json
            }
        }
    }

    /// Builds an unfiltered appender writing this format to `sink`.
    pub fn appender(self, sink: SharedSink, stamp_caller: bool) -> Arc<dyn Appender> {
        match self {
            Format::Json => Arc::new(JsonAppender::new(sink, stamp_caller)),
        }
    }
}

/// Writes each record as one JSON object per line, stamped with a UTC timestamp.
#[derive(Debug, Clone)]
pub struct JsonAppender {
    sink: SharedSink,
    stamp_caller: bool,
}

impl JsonAppender {
    pub fn new(sink: SharedSink, stamp_caller: bool) -> Self {
        Self { sink, stamp_caller }
    }

    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, LogError> {
        let line = JsonLine {
            record,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            caller: self.stamp_caller.then(|| record.caller_string()),
        };
        let mut buf = serde_json::to_vec(&line)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

impl Appender for JsonAppender {
    fn append(&self, record: &Record) -> Result<(), LogError> {
        let buf = self.encode(record)?;
        self.sink.write_record(&buf)?;
        Ok(())
    }
}

struct JsonLine<'a> {
    record: &'a Record,
    ts: String,
    caller: Option<String>,
}

// Field order: level, caller pairs, ts, caller, logger.
impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LEVEL_KEY, self.record.level.as_str())?;
        for (key, value) in &self.record.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(TIMESTAMP_KEY, &self.ts)?;
        if let Some(caller) = &self.caller {
            map.serialize_entry(CALLER_KEY, caller)?;
        }
        if let Some(logger) = &self.record.logger {
            map.serialize_entry(LOGGER_KEY, logger)?;
        }
        map.end()
    }
}

/// Drops records below the configured minimum severity.
#[derive(Clone)]
pub struct LevelFilter {
    inner: Arc<dyn Appender>,
    setting: LevelSetting,
}

impl LevelFilter {
    pub fn new(inner: Arc<dyn Appender>, setting: LevelSetting) -> Self {
        Self { inner, setting }
    }
}

impl Appender for LevelFilter {
    fn append(&self, record: &Record) -> Result<(), LogError> {
        if self.setting.allows(record.level) {
            self.inner.append(record)
        } else {
            Ok(())
        }
    }
}
