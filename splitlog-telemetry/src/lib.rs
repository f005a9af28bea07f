//! # Splitlog Telemetry
//!
//! Crate for the per-level entry counter and the library's own diagnostics output.

pub mod diagnostics;
pub mod metrics;

pub use diagnostics::init_diagnostics;
pub use metrics::{gather, LevelCounter, TelemetryError};
