//! Port for structured query-trace logging.
//!
//! Defines the [`TraceLogger`] trait for recording engine events (query
//! received, plan resolved, steps settled, prompts emitted) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! query lifecycle in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured engine event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields; implementations add the timestamp.
pub struct TraceEvent {
    /// Event type identifier (e.g., "plan_resolved", "step_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TraceEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging engine events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible:
/// a logging failure must never disturb the query itself, so it is
/// swallowed.
pub trait TraceLogger: Send + Sync {
    /// Record an engine event.
    fn log(&self, event: TraceEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTraceLogger;

impl TraceLogger for NoTraceLogger {
    fn log(&self, _event: TraceEvent) {}
}
