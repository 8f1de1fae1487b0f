//! Observability for rwsplit
//!
//! - `logger`: JSON line logger with a process-wide threshold
//! - `events`: closed catalog of routing events and their severities
//! - `metrics`: lock-free routing counters
//!
//! Nothing here feeds back into routing, and a failed write is ignored.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RoutingMetrics};

/// Log a routing event at its catalogued severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::emit(event.severity(), event.as_str(), fields);
}
