//! Runtime-switchable console logging.
//!
//! A [`DebugGate`] owns a [`GateConfig`] and decides, per call, whether a
//! message reaches its [`ConsoleSink`]. Output is off by default and can be
//! turned on, filtered by [`Severity`], and decorated with a timestamp and
//! module tag at runtime.

pub mod banner;
pub mod cli;
pub mod clock;
pub mod config;
pub mod gate;
pub mod level;
pub mod logging;
pub mod sink;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{ConfigError, ConfigPatch, GateConfig};
pub use gate::{DebugGate, GateStatus, ScopedLogger};
pub use level::Severity;
pub use sink::{ConsoleSink, Emitted, MemorySink, StdFormat, StdSink};

#[doc(hidden)]
pub use serde_json as __serde_json;

/// Build a `Vec<serde_json::Value>` of message parts from anything
/// serializable.
///
/// ```
/// let parts = debug_gate::parts!["loaded", 3, {"ok": true}];
/// assert_eq!(parts.len(), 3);
/// ```
#[macro_export]
macro_rules! parts {
    ($($part:tt),* $(,)?) => {
        vec![$($crate::__serde_json::json!($part)),*]
    };
}
