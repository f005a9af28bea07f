//! Log entries as built by callers, and the records handed to appenders.

use std::panic::Location;

use serde_json::Value;

use crate::level::{Level, Severity};

/// Key holding the severity name in a written record.
pub const LEVEL_KEY: &str = "level";
/// Key holding the UTC timestamp stamped by the appender.
pub const TIMESTAMP_KEY: &str = "ts";
/// Key holding the `file:line` of the code that called `log`. Error stream only.
pub const CALLER_KEY: &str = "caller";
/// Key holding the logical name of the routing logger.
pub const LOGGER_KEY: &str = "logger";

/// One log event: an optional severity plus ordered key/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    severity: Option<Severity>,
    fields: Vec<(String, Value)>,
}

impl Entry {
    /// An entry without severity. Routing drops it unless a severity is set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leveled(level: Level) -> Self {
        Self::new().severity(level)
    }

    pub fn error() -> Self {
        Self::leveled(Level::Error)
    }

    pub fn warn() -> Self {
        Self::leveled(Level::Warn)
    }

    pub fn info() -> Self {
        Self::leveled(Level::Info)
    }

    pub fn debug() -> Self {
        Self::leveled(Level::Debug)
    }

    pub fn severity(mut self, severity: impl Into<Severity>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Appends a key/value pair, keeping insertion order.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get_severity(&self) -> Option<&Severity> {
        self.severity.as_ref()
    }

    /// The recognized level, `None` when absent or custom.
    pub fn level(&self) -> Option<Level> {
        self.severity.as_ref().and_then(Severity::level)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

/// A routed entry on its way to an appender.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub fields: Vec<(String, Value)>,
    /// Logical name of the routing logger, written last.
    pub logger: Option<String>,
    /// Code location that called `log`.
    pub caller: &'static Location<'static>,
}

impl Record {
    #[track_caller]
    pub fn new(level: Level, fields: Vec<(String, Value)>) -> Self {
        Self {
            level,
            fields,
            logger: None,
            caller: Location::caller(),
        }
    }

    pub fn caller_string(&self) -> String {
        format!("{}:{}", self.caller.file(), self.caller.line())
    }
}
