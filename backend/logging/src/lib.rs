//! Telemetry and structured logging for the phone agent.
//!
//! Handles subscriber setup, file rotation, log redaction, and the agent event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AgentEvent, EventLogEntry, EventLogger};
pub use logger::{file_appender, init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
