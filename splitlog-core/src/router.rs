//! The routing logger.
//!
//! Error entries go to the unfiltered stderr appender, which also stamps the
//! caller location. Warn, info and debug entries share one stdout appender
//! wrapped in a [`LevelFilter`]. Every entry carrying a recognized level bumps
//! the counter for that level, whether or not it is written.

use std::fmt;
use std::sync::Arc;

use splitlog_config::LogConfig;
use tracing::debug;

use crate::appender::{Appender, Format, LevelFilter};
use crate::counter::Counter;
use crate::entry::{Entry, Record};
use crate::error::LogError;
use crate::level::{Level, LevelSetting};
use crate::sink::SinkRegistry;

/// Severity to appender dispatch table.
#[derive(Clone, Default)]
struct Destinations {
    error: Option<Arc<dyn Appender>>,
    warn: Option<Arc<dyn Appender>>,
    info: Option<Arc<dyn Appender>>,
    debug: Option<Arc<dyn Appender>>,
}

impl Destinations {
    fn slot(&mut self, level: Level) -> &mut Option<Arc<dyn Appender>> {
        match level {
            Level::Error => &mut self.error,
            Level::Warn => &mut self.warn,
            Level::Info => &mut self.info,
            Level::Debug => &mut self.debug,
        }
    }

    fn get(&self, level: Level) -> Option<&Arc<dyn Appender>> {
        match level {
            Level::Error => self.error.as_ref(),
            Level::Warn => self.warn.as_ref(),
            Level::Info => self.info.as_ref(),
            Level::Debug => self.debug.as_ref(),
        }
    }
}

/// Dispatches leveled entries to per-severity appenders, tagging them with the logger name.
#[derive(Clone)]
pub struct RoutingLogger {
    name: String,
    destinations: Destinations,
    counter: Option<Arc<dyn Counter>>,
}

impl RoutingLogger {
    pub fn builder(name: impl Into<String>) -> RoutingLoggerBuilder {
        RoutingLoggerBuilder {
            name: name.into(),
            destinations: Destinations::default(),
            counter: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Routes one entry.
    ///
    /// Entries without a recognized level are dropped silently. A write failure
    /// from the destination is returned as is.
    #[track_caller]
    pub fn log(&self, entry: Entry) -> Result<(), LogError> {
        let Some(level) = entry.level() else {
            return Ok(());
        };

        if let Some(counter) = &self.counter {
            counter.increment(level.as_str());
        }

        let Some(target) = self.destinations.get(level) else {
            return Ok(());
        };

        let mut record = Record::new(level, entry.into_fields());
        record.logger = Some(self.name.clone());
        target.append(&record)
    }
}

impl fmt::Debug for RoutingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingLogger")
            .field("name", &self.name)
            .field("counter", &self.counter.is_some())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`RoutingLogger`]. The dispatch table is fixed once built.
pub struct RoutingLoggerBuilder {
    name: String,
    destinations: Destinations,
    counter: Option<Arc<dyn Counter>>,
}

impl RoutingLoggerBuilder {
    pub fn destination(mut self, level: Level, appender: Arc<dyn Appender>) -> Self {
        *self.destinations.slot(level) = Some(appender);
        self
    }

    pub fn counter(mut self, counter: Option<Arc<dyn Counter>>) -> Self {
        self.counter = counter;
        self
    }

    pub fn build(self) -> RoutingLogger {
        RoutingLogger {
            name: self.name,
            destinations: self.destinations,
            counter: self.counter,
        }
    }
}

/// Handle returned by [`create_logger`]: a routing logger, or a no-op when logging is off.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Option<RoutingLogger>,
}

impl Logger {
    /// A logger that writes and counts nothing.
    pub fn nop() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.as_ref().map(RoutingLogger::name)
    }

    #[track_caller]
    pub fn log(&self, entry: Entry) -> Result<(), LogError> {
        match &self.inner {
            Some(router) => router.log(entry),
            None => Ok(()),
        }
    }
}

impl From<RoutingLogger> for Logger {
    fn from(router: RoutingLogger) -> Self {
        Self {
            inner: Some(router),
        }
    }
}

/// Builds a stdout/stderr routing logger named `name`.
///
/// A `"none"` level yields [`Logger::nop`] without touching the registry.
/// Otherwise the registry's shared sinks are created if needed and wrapped in
/// JSON appenders: stderr receives errors unfiltered, stdout receives the other
/// levels filtered by the configured threshold.
pub fn create_logger(
    name: impl Into<String>,
    counter: Option<Arc<dyn Counter>>,
    config: &LogConfig,
    registry: &SinkRegistry,
) -> Logger {
    let setting = LevelSetting::resolve(&config.level);
    if setting.is_off() {
        return Logger::nop();
    }

    let name = name.into();
    debug!(logger = %name, ?setting, "creating routing logger");

    let format = Format::resolve(&config.format);
    let sinks = registry.sinks();
    let out = format.appender(sinks.out.clone(), false);
    let err = format.appender(sinks.err.clone(), true);
    let out: Arc<dyn Appender> = Arc::new(LevelFilter::new(out, setting));

    RoutingLogger::builder(name)
        .destination(Level::Error, err)
        .destination(Level::Warn, Arc::clone(&out))
        .destination(Level::Info, Arc::clone(&out))
        .destination(Level::Debug, out)
        .counter(counter)
        .build()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use crate::sink::BufferWriter;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const NAME: &str = "fake";

    #[derive(Default)]
    struct TestCounter(Mutex<HashMap<String, usize>>);

    impl TestCounter {
        fn get(&self, label: &str) -> usize {
            self.0.lock().get(label).copied().unwrap_or(0)
        }

        fn total(&self) -> usize {
            self.0.lock().values().sum()
        }
    }

    impl Counter for TestCounter {
        fn increment(&self, label: &str) {
            *self.0.lock().entry(label.to_string()).or_default() += 1;
        }
    }

    struct Harness {
        out: BufferWriter,
        err: BufferWriter,
        counter: Arc<TestCounter>,
        registry: SinkRegistry,
    }

    impl Harness {
        fn new() -> Self {
            let out = BufferWriter::new();
            let err = BufferWriter::new();
            let registry = SinkRegistry::with_writers(out.clone(), err.clone());
            Self {
                out,
                err,
                counter: Arc::new(TestCounter::default()),
                registry,
            }
        }

        fn logger(&self, level: &str) -> Logger {
            let counter: Arc<dyn Counter> = self.counter.clone();
            create_logger(NAME, Some(counter), &LogConfig::with_level(level), &self.registry)
        }
    }

    fn records(buffer: &BufferWriter) -> Vec<Value> {
        buffer
            .lines()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn warn_threshold_scenario() {
        let h = Harness::new();
        let logger = h.logger("warn");

        logger.log(Entry::info().field("key", "value")).unwrap();
        assert!(h.out.is_empty());
        assert!(h.err.is_empty());
        assert_eq!(h.counter.get("info"), 1);

        logger.log(Entry::error().field("key", "value")).unwrap();
        assert!(h.out.is_empty());
        let errors = records(&h.err);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["key"], "value");
        assert_eq!(errors[0]["logger"], NAME);
        assert_eq!(errors[0]["level"], "error");
        assert_eq!(h.counter.get("error"), 1);
    }

    #[test]
    fn error_records_carry_caller_of_log() {
        let h = Harness::new();
        let logger = h.logger("info");

        let line = line!() + 1;
        logger.log(Entry::error()).unwrap();
        logger.log(Entry::warn()).unwrap();

        let errors = records(&h.err);
        assert_eq!(errors[0]["caller"], format!("{}:{}", file!(), line));
        let out = records(&h.out);
        assert!(out[0].get("caller").is_none());
        assert!(out[0].get("ts").is_some());
    }

    #[test]
    fn logger_name_is_appended_last() {
        let h = Harness::new();
        h.logger("debug")
            .log(Entry::debug().field("a", 1).field("logger", "shadow"))
            .unwrap();

        let line = h.out.contents();
        let last = line.rfind("\"logger\"").unwrap();
        assert!(line[last..].contains(NAME));
        assert!(line.find("\"a\"").unwrap() < line.find("\"ts\"").unwrap());
    }

    #[test]
    fn none_level_is_a_nop() {
        let h = Harness::new();
        for level in ["none", "NONE", "  None\n"] {
            let logger = h.logger(level);
            assert!(!logger.is_enabled());
            for l in Level::ALL {
                logger.log(Entry::leveled(l).field("k", "v")).unwrap();
            }
        }
        assert!(!h.registry.is_initialized());
        assert!(h.out.is_empty());
        assert!(h.err.is_empty());
        assert_eq!(h.counter.total(), 0);
    }

    #[test]
    fn entries_without_level_are_dropped() {
        let h = Harness::new();
        let logger = h.logger("debug");

        logger.log(Entry::new().field("key", "value")).unwrap();
        logger
            .log(Entry::new().severity(Severity::custom("invalid")).field("key", "value"))
            .unwrap();

        assert!(h.out.is_empty());
        assert!(h.err.is_empty());
        assert_eq!(h.counter.total(), 0);
    }

    #[test]
    fn unrecognized_level_behaves_like_debug() {
        let garbage = Harness::new();
        let debug = Harness::new();
        for (h, level) in [(&garbage, "invalid-garbage"), (&debug, "debug")] {
            let logger = h.logger(level);
            for l in Level::ALL {
                logger.log(Entry::leveled(l).field("n", l.as_str())).unwrap();
            }
        }

        let strip = |v: Vec<Value>| -> Vec<(Value, Value)> {
            v.into_iter().map(|r| (r["level"].clone(), r["n"].clone())).collect()
        };
        assert_eq!(strip(records(&garbage.out)), strip(records(&debug.out)));
        assert_eq!(strip(records(&garbage.err)), strip(records(&debug.err)));
        assert_eq!(records(&garbage.out).len(), 3);
    }

    #[test]
    fn counts_even_without_destination() {
        let counter = Arc::new(TestCounter::default());
        let dyn_counter: Arc<dyn Counter> = counter.clone();
        let logger = RoutingLogger::builder(NAME).counter(Some(dyn_counter)).build();

        logger.log(Entry::warn()).unwrap();
        logger.log(Entry::warn()).unwrap();

        assert_eq!(counter.get("warn"), 2);
    }

    #[test]
    fn logs_without_counter() {
        let h = Harness::new();
        let logger = create_logger(NAME, None, &LogConfig::default(), &h.registry);
        logger.log(Entry::info().field("k", "v")).unwrap();
        assert_eq!(records(&h.out)[0]["k"], "v");
        assert_eq!(logger.name(), Some(NAME));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_returned_once() {
        let counter = Arc::new(TestCounter::default());
        let dyn_counter: Arc<dyn Counter> = counter.clone();
        let registry = SinkRegistry::with_writers(io::sink(), FailingWriter);
        let logger = create_logger(NAME, Some(dyn_counter), &LogConfig::default(), &registry);

        let result = logger.log(Entry::error().field("key", "value"));
        assert!(matches!(result, Err(LogError::Write(_))));
        assert_eq!(counter.get("error"), 1);
        assert!(logger.log(Entry::info()).is_ok());
    }

    #[test]
    fn concurrent_loggers_share_sinks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let buffer = BufferWriter::new();
        let shared = buffer.clone();
        let registry = Arc::new(SinkRegistry::from_factory(move |_| -> Box<dyn Write + Send> {
            counted.fetch_add(1, Ordering::SeqCst);
            Box::new(shared.clone())
        }));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let logger = create_logger(
                        format!("worker-{t}"),
                        None,
                        &LogConfig::with_level("debug"),
                        &registry,
                    );
                    for i in 0..25 {
                        logger
                            .log(Entry::info().field("thread", t).field("i", i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let lines = records(&buffer);
        assert_eq!(lines.len(), 200);
        for record in lines {
            let thread = record["thread"].as_i64().unwrap();
            assert_eq!(record["logger"], format!("worker-{thread}"));
        }
    }

    fn any_level() -> impl Strategy<Value = Level> {
        prop::sample::select(Level::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn routing_follows_threshold(min in any_level(), level in any_level()) {
            let h = Harness::new();
            h.logger(min.as_str()).log(Entry::leveled(level)).unwrap();

            let to_out = !h.out.is_empty();
            let to_err = !h.err.is_empty();
            prop_assert_eq!(to_out, level >= min && level != Level::Error);
            prop_assert_eq!(to_err, level == Level::Error);
            prop_assert_eq!(h.counter.get(level.as_str()), 1);
        }
    }
}
