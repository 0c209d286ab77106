//! Structured query-trace logging.
//!
//! Provides [`JsonlTraceLogger`], a JSONL file writer that implements the
//! [`TraceLogger`](crossdesk_application::TraceLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlTraceLogger;
