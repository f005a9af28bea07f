//! Severity levels and the minimum-severity threshold derived from configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

/// Severity of a log entry, ordered `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Lowercase name, used as the record value and the counter label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity level '{0}'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// The severity tag carried by an entry.
///
/// `Custom` is the unrecognized sentinel: entries tagged with it are dropped by routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Level(Level),
    Custom(String),
}

impl Severity {
    pub fn custom(name: impl Into<String>) -> Self {
        Severity::Custom(name.into())
    }

    /// The recognized level, if any.
    pub fn level(&self) -> Option<Level> {
        match self {
            Severity::Level(level) => Some(*level),
            Severity::Custom(_) => None,
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        Severity::Level(level)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Level(level) => level.fmt(f),
            Severity::Custom(name) => f.write_str(name),
        }
    }
}

/// Minimum severity let through the standard-stream filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSetting {
    /// Nothing is logged and nothing is counted.
    Off,
    /// Entries at or above the level pass.
    Min(Level),
}

impl LevelSetting {
    /// Lets every recognized level through.
    pub const ALLOW_ALL: LevelSetting = LevelSetting::Min(Level::Debug);

    /// Resolves a configured level string, trimmed and case-insensitive.
    ///
    /// `"none"` turns logging off. Unrecognized strings allow everything rather
    /// than failing, so a typo in configuration never hides logs.
    pub fn resolve(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized == "none" {
            return LevelSetting::Off;
        }
        match normalized.parse::<Level>() {
            Ok(level) => LevelSetting::Min(level),
            Err(_) => {
                debug!(level = raw, "unrecognized level setting, falling back to allow all");
                LevelSetting::ALLOW_ALL
            }
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, LevelSetting::Off)
    }

    pub fn allows(&self, level: Level) -> bool {
        match self {
            LevelSetting::Off => false,
            LevelSetting::Min(min) => level >= *min,
        }
    }
}
