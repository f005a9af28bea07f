//! # splitlog-core
//!
//! Structured logging facade that routes leveled entries to one of two streams.
//!
//! - Error entries are written, unfiltered and stamped with the caller location,
//!   to standard error.
//! - Warn, info and debug entries are written to standard output, filtered by
//!   the configured minimum level.
//! - Each leveled entry increments a per-level counter when one is supplied.
//!
//! ```no_run
//! use splitlog_config::LogConfig;
//! use splitlog_core::{create_logger, Entry, SinkRegistry};
//!
//! let registry = SinkRegistry::stdio();
//! let logger = create_logger("mylogger", None, &LogConfig::default(), &registry);
//! logger.log(Entry::info().field("key", "value")).ok();
//! ```

pub mod appender;
pub mod counter;
pub mod entry;
pub mod error;
pub mod level;
pub mod router;
pub mod sink;

pub use appender::{Appender, Format, JsonAppender, LevelFilter};
pub use counter::Counter;
pub use entry::{Entry, Record, CALLER_KEY, LEVEL_KEY, LOGGER_KEY, TIMESTAMP_KEY};
pub use error::LogError;
pub use level::{Level, LevelSetting, ParseLevelError, Severity};
pub use router::{create_logger, Logger, RoutingLogger, RoutingLoggerBuilder};
pub use sink::{BufferWriter, SharedSink, SinkRegistry, StdSinks, Stream};
